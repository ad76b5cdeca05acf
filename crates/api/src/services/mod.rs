pub mod dispatcher;
pub mod mobility;
pub mod scenario;
