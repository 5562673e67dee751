//! Compute devices with GPU adapter detection.

use crate::error::{Error, Result};
use burn::backend::wgpu::{init_device, RuntimeOptions, WgpuDevice, WgpuSetup};
use burn::backend::{Autodiff, NdArray, Wgpu};
use wgpu::{Backends, DeviceDescriptor, Features, Limits, PowerPreference};

/// Inference backend on CPU.
pub type CpuBackend = NdArray;
/// Inference backend on GPU.
pub type GpuBackend = Wgpu;
/// Training backend on CPU.
pub type CpuTrainingBackend = Autodiff<CpuBackend>;
/// Training backend on GPU.
pub type GpuTrainingBackend = Autodiff<GpuBackend>;
pub type CpuDevice = burn::backend::ndarray::NdArrayDevice;

/// Where training or generation should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePlacement {
    /// CPU via NdArray backend (always available).
    #[default]
    Cpu,
    /// GPU via Wgpu backend (falls back to CPU without an adapter).
    Gpu,
}

/// A concrete device after resolving a [`DevicePlacement`].
#[derive(Debug, Clone)]
pub enum ResolvedDevice {
    Cpu(CpuDevice),
    Gpu(WgpuDevice),
}

impl ResolvedDevice {
    pub fn placement(&self) -> DevicePlacement {
        match self {
            ResolvedDevice::Cpu(_) => DevicePlacement::Cpu,
            ResolvedDevice::Gpu(_) => DevicePlacement::Gpu,
        }
    }
}

/// Holds the CPU device and, when one was found, a GPU device.
pub struct DevicePool {
    gpu_device: Option<WgpuDevice>,
    cpu_device: CpuDevice,
}

impl DevicePool {
    /// Probe for a GPU adapter. Never fails; no adapter means CPU only.
    pub fn detect() -> Self {
        let gpu_device = match Self::init_gpu() {
            Ok(device) => Some(device),
            Err(e) => {
                tracing::debug!("GPU unavailable: {}", e);
                None
            }
        };

        Self {
            gpu_device,
            cpu_device: CpuDevice::default(),
        }
    }

    /// Skip GPU probing entirely.
    pub fn cpu_only() -> Self {
        Self {
            gpu_device: None,
            cpu_device: CpuDevice::default(),
        }
    }

    fn init_gpu() -> Result<WgpuDevice> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let adapter = pollster::block_on(async {
            instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: PowerPreference::HighPerformance,
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await
        })
        .map_err(|_| Error::BackendInit("No GPU adapter available".into()))?;

        let adapter_info = adapter.get_info();
        tracing::debug!("Selected GPU adapter: {:?}", adapter_info);

        let (device, queue) = pollster::block_on(async {
            adapter
                .request_device(&DeviceDescriptor {
                    label: Some("wavae GPU"),
                    required_features: Features::empty(),
                    required_limits: Limits::default(),
                    memory_hints: Default::default(),
                    trace: Default::default(),
                })
                .await
        })
        .map_err(|e| Error::BackendInit(e.to_string()))?;

        let setup = WgpuSetup {
            instance,
            adapter,
            device,
            queue,
            backend: adapter_info.backend,
        };

        Ok(init_device(setup, RuntimeOptions::default()))
    }

    fn preferred_backends() -> Backends {
        #[cfg(target_os = "macos")]
        {
            Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            Backends::DX12 | Backends::VULKAN
        }
        #[cfg(target_os = "linux")]
        {
            Backends::VULKAN
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            Backends::all()
        }
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu_device.is_some()
    }

    pub fn cpu_device(&self) -> &CpuDevice {
        &self.cpu_device
    }

    pub fn gpu_device(&self) -> Option<&WgpuDevice> {
        self.gpu_device.as_ref()
    }

    /// Map a requested placement to a device, falling back to CPU.
    pub fn resolve(&self, placement: DevicePlacement) -> ResolvedDevice {
        match (placement, &self.gpu_device) {
            (DevicePlacement::Gpu, Some(device)) => ResolvedDevice::Gpu(device.clone()),
            (DevicePlacement::Gpu, None) => {
                tracing::warn!("GPU placement requested but no adapter found; using CPU");
                ResolvedDevice::Cpu(self.cpu_device)
            }
            (DevicePlacement::Cpu, _) => ResolvedDevice::Cpu(self.cpu_device),
        }
    }
}

impl Default for DevicePool {
    fn default() -> Self {
        Self::detect()
    }
}
