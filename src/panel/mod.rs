pub mod notifications;
pub mod surface;

pub use self::notifications::NotificationPanel;
pub use self::surface::{Point, Rect, Surface};
