pub mod http;
pub mod params;
pub mod status;
pub mod stream;

pub use http::HttpBackend;
pub use params::{
    decode_points, ParamGroup, ParamKey, ParamKind, ParamPatch, ParamValue, ParameterSet, ROI_KEY,
};
pub use status::{FrameSize, OverlayPayload, RunMode, Segment, TelemetrySnapshot};
pub use stream::StreamName;
