use candle_core::Device;

/// Request for a specific device, used by pipeline builders.
#[derive(Clone, Debug, Default)]
pub enum DeviceRequest {
    /// Use CUDA if available, otherwise CPU (default behavior).
    #[default]
    Default,
    /// Force CPU even if CUDA is available.
    Cpu,
    /// Provide an already constructed device.
    Explicit(Device),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> candle_core::Result<Device> {
        match self {
            DeviceRequest::Default => Device::cuda_if_available(0),
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Explicit(d) => Ok(d),
        }
    }

    /// Resolve, falling back to CPU when the requested device is unusable.
    pub fn resolve_or_cpu(self) -> Device {
        let requested = format!("{self:?}");
        match self.resolve() {
            Ok(device) => device,
            Err(e) => {
                tracing::warn!(device = %requested, error = %e, "device unavailable, using CPU");
                Device::Cpu
            }
        }
    }
}

/// Trait providing convenience methods for pipeline builders to select a device.
pub trait DeviceSelectable: Sized {
    /// Returns a mutable reference to the builder's internal [`DeviceRequest`].
    fn device_request_mut(&mut self) -> &mut DeviceRequest;

    /// Force the pipeline to run on CPU.
    fn cpu(mut self) -> Self {
        *self.device_request_mut() = DeviceRequest::Cpu;
        self
    }

    /// Provide an explicit [`Device`].
    fn device(mut self, device: Device) -> Self {
        *self.device_request_mut() = DeviceRequest::Explicit(device);
        self
    }
}
