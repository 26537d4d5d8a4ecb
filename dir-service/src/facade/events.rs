//! `Events` RPC: server-streams the process-wide [`crate::events::EventBus`]
//! to any connected client.

use std::pin::Pin;

use dir_proto::dir::v1::events_server::Events;
use dir_proto::dir::v1::{Event, EventsRequest};
use futures::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tonic::{Request, Response, Status};

use crate::state::AppState;

pub struct EventsService {
    state: AppState,
}

impl EventsService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

type SubscribeStream = Pin<Box<dyn Stream<Item = Result<Event, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl Events for EventsService {
    type SubscribeStream = SubscribeStream;

    async fn subscribe(&self, _request: Request<EventsRequest>) -> Result<Response<Self::SubscribeStream>, Status> {
        let receiver = self.state.events.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(|item| match item {
            Ok(event) => {
                let (event_type, cid) = match &event {
                    dir_types::RecordEvent::RecordPushed { cid } => ("RECORD_PUSHED", cid.clone()),
                    dir_types::RecordEvent::RecordDeleted { cid } => ("RECORD_DELETED", cid.clone()),
                    dir_types::RecordEvent::RecordPublished { cid } => ("RECORD_PUBLISHED", cid.clone()),
                    dir_types::RecordEvent::RecordUnpublished { cid } => ("RECORD_UNPUBLISHED", cid.clone()),
                    dir_types::RecordEvent::RecordSigned { cid } => ("RECORD_SIGNED", cid.clone()),
                };
                Some(Ok(Event { r#type: event_type.to_string(), cid }))
            }
            // A lagging subscriber just misses the oldest events; it is
            // not disconnected.
            Err(_lagged) => None,
        });
        Ok(Response::new(Box::pin(stream)))
    }
}
