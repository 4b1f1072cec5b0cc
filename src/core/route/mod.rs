//! Topic routing and event publication

pub mod publisher;
pub mod topic;

pub use publisher::EventPublisher;
pub use topic::{identity_converter, PayloadConverter, Topic, TopicMatch, TopicRegistry};
