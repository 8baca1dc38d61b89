use candle_core::Device;
use tracing::{debug, warn};

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

use super::error::EmbeddingError;

/// Picks the compute device for the sentence model.
///
/// Tries Metal, then CUDA, depending on which features are compiled in. Any GPU failure is
/// logged and the sentence model runs on the CPU instead.
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[allow(unused_mut)]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!(device = "metal", "Sentence model using GPU");
            return Ok(device);
        }
        Err(e) => {
            warn!(device = "metal", error = %e, "GPU device unavailable");
            failures.push(format!("metal: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!(device = "cuda", "Sentence model using GPU");
            return Ok(device);
        }
        Err(e) => {
            warn!(device = "cuda", error = %e, "GPU device unavailable");
            failures.push(format!("cuda: {e}"));
        }
    }

    if failures.is_empty() {
        debug!("No GPU backend compiled, using CPU");
    } else {
        warn!(failures = %failures.join("; "), "Falling back to CPU device");
    }

    Ok(Device::Cpu)
}

/// Short label for logs and `Debug` output.
pub fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}
