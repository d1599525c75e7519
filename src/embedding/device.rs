use candle_core::{DType, Device};
use tracing::warn;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::EmbeddingError;

/// Selects the compute device based on enabled features (falls back to CPU).
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let failures: Vec<String> = Vec::new();

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                if cfg!(feature = "metal") {
                    warn!(error = %msg, "CUDA device unavailable, trying Metal");
                } else {
                    warn!(error = %msg, "CUDA device unavailable");
                }
                failures.push(format!("cuda failed: {msg}"));
            }
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "Metal device unavailable");
                failures.push(format!("metal failed: {msg}"));
            }
        }
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        debug!("No GPU features enabled");
    }

    let reason = if !cfg!(any(feature = "metal", feature = "cuda")) {
        "no GPU backend compiled".to_string()
    } else if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };

    warn!(reason = %reason, "Falling back to CPU device");
    Ok(Device::Cpu)
}

/// Picks the weight dtype for `device`.
///
/// Half precision is only honoured on a GPU; on CPU the request is downgraded to F32.
pub fn select_dtype(device: &Device, use_fp16: bool) -> DType {
    if !use_fp16 {
        return DType::F32;
    }

    if device.is_cuda() || device.is_metal() {
        DType::F16
    } else {
        warn!("FP16 requested but no GPU device is in use; using FP32 instead");
        DType::F32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_dtype_cpu() {
        assert_eq!(select_dtype(&Device::Cpu, false), DType::F32);
        assert_eq!(select_dtype(&Device::Cpu, true), DType::F32);
    }
}
