mod detection;
mod history;
mod rect;
mod session;
mod speed;
mod view_transformer;
mod violation;
mod zone;

pub use detection::{Anchor, TrackId, TrackedDetection};
pub use history::TrackHistory;
pub use rect::{PixelRegion, Rect};
pub use session::{Session, SessionSummary};
pub use speed::{METRES_PER_SECOND_TO_KMH, Speed, SpeedEstimator};
pub use view_transformer::ViewTransformer;
pub use violation::ViolationDetector;
pub use zone::PolygonZone;
