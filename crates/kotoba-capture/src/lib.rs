mod device;
mod encode;
mod error;
mod session;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
#[cfg(feature = "native-camera")]
mod native;
#[cfg(feature = "screen")]
mod screen;

use std::sync::Arc;

pub use device::{CameraBackend, CaptureRequest, Frame, UnavailableCamera, VideoStream};
pub use encode::{encode_jpeg, image_from_bytes, load_image_file};
pub use error::CaptureError;
#[cfg(feature = "native-camera")]
pub use native::NativeCamera;
#[cfg(feature = "screen")]
pub use screen::ScreenCamera;
pub use session::CaptureSession;

/// Best camera backend compiled into this build
pub fn default_backend() -> Arc<dyn CameraBackend> {
    #[cfg(feature = "native-camera")]
    {
        return Arc::new(NativeCamera);
    }

    #[cfg(all(feature = "screen", not(feature = "native-camera")))]
    {
        return Arc::new(ScreenCamera);
    }

    #[allow(unreachable_code)]
    Arc::new(UnavailableCamera)
}
