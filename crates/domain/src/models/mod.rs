//! Domain models.

pub mod cell;
pub mod notification;
pub mod path;
pub mod subscription;
pub mod ue;

pub use cell::{Cell, PlmnId};
pub use notification::{
    GeographicalCoordinates, LocationInfo, MonitoringEventReport, MonitoringNotification, Point,
};
pub use path::{Path, Waypoint};
pub use subscription::{MonitoringType, ReachabilityType, Subscription};
pub use ue::{SpeedClass, Ue};
