pub mod clock;
pub mod url;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::url::UrlUtils;
