use candle_core::Device;
use tracing::info;

/// Pick the accelerator compiled in, falling back to CPU.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            info!("Embedding device: Metal (MPS)");
            return dev;
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(dev) = Device::new_cuda(0) {
            info!("Embedding device: CUDA");
            return dev;
        }
    }
    info!("Embedding device: CPU");
    Device::Cpu
}
