//! Ray-trace backend selection (spec.md §5): a `RayTraceBackend` trait with
//! a CPU implementation always compiled in, and a `gpu` feature compiling an
//! additional backend stub -- the same shape as the teacher's
//! `#[cfg(feature = "cuda")]` split between its CPU and GPU modellers.

use cfg_if::cfg_if;

use crate::config::Config;
use crate::error::RayBudgetExhausted;
use crate::geom::Vec3;
use crate::motion::Pose;
use crate::raylog::RayLogRecord;
use crate::raytrace::{trace_tx_channel, RayReturn, SceneSnapshot};
use crate::waveform::TxChannel;

/// One Tx channel's ray-tracing pass against a scene snapshot, abstracted
/// over the execution backend (spec.md §5).
pub trait RayTraceBackend {
    #[allow(clippy::too_many_arguments)]
    fn trace_tx_channel(
        &self,
        tx_ch: &TxChannel,
        tx_pose: Pose,
        rx_world: &[(Vec3<f64>, Vec3<num_complex::Complex<f64>>)],
        scene: &SceneSnapshot,
        config: &Config,
        freq_hz: f64,
        radar_origin_world: Vec3<f64>,
        snapshot_index: usize,
        on_ray_log: Option<&mut dyn FnMut(RayLogRecord)>,
    ) -> (Vec<RayReturn>, Option<RayBudgetExhausted>);
}

/// The CPU fork-join path (`raytrace::trace_tx_channel`), always available.
pub struct CpuBackend;

impl RayTraceBackend for CpuBackend {
    fn trace_tx_channel(
        &self,
        tx_ch: &TxChannel,
        tx_pose: Pose,
        rx_world: &[(Vec3<f64>, Vec3<num_complex::Complex<f64>>)],
        scene: &SceneSnapshot,
        config: &Config,
        freq_hz: f64,
        radar_origin_world: Vec3<f64>,
        snapshot_index: usize,
        on_ray_log: Option<&mut dyn FnMut(RayLogRecord)>,
    ) -> (Vec<RayReturn>, Option<RayBudgetExhausted>) {
        trace_tx_channel(
            tx_ch,
            tx_pose,
            rx_world,
            scene,
            config,
            freq_hz,
            radar_origin_world,
            snapshot_index,
            on_ray_log,
        )
    }
}

cfg_if! {
    if #[cfg(feature = "gpu")] {
        /// Data-parallel GPU backend stub. No GPU kernel ships with this
        /// crate yet; host-side ray generation and accumulation still go
        /// through the CPU path, matching the teacher's CUDA split where the
        /// host always retains a working CPU fallback.
        pub struct GpuBackend;

        impl RayTraceBackend for GpuBackend {
            fn trace_tx_channel(
                &self,
                tx_ch: &TxChannel,
                tx_pose: Pose,
                rx_world: &[(Vec3<f64>, Vec3<num_complex::Complex<f64>>)],
                scene: &SceneSnapshot,
                config: &Config,
                freq_hz: f64,
                radar_origin_world: Vec3<f64>,
                snapshot_index: usize,
                on_ray_log: Option<&mut dyn FnMut(RayLogRecord)>,
            ) -> (Vec<RayReturn>, Option<RayBudgetExhausted>) {
                CpuBackend.trace_tx_channel(
                    tx_ch,
                    tx_pose,
                    rx_world,
                    scene,
                    config,
                    freq_hz,
                    radar_origin_world,
                    snapshot_index,
                    on_ray_log,
                )
            }
        }

        /// Picks the GPU backend when `config.use_gpu` is set, else CPU.
        pub fn backend(config: &Config) -> Box<dyn RayTraceBackend> {
            if config.use_gpu {
                Box::new(GpuBackend)
            } else {
                Box::new(CpuBackend)
            }
        }
    } else {
        /// Without the `gpu` feature the CPU path is the only backend; a
        /// `config.use_gpu` request is honoured as far as it can be, since
        /// there is no GPU kernel compiled in to select instead.
        pub fn backend(_config: &Config) -> Box<dyn RayTraceBackend> {
            Box::new(CpuBackend)
        }
    }
}
