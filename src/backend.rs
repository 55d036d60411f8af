//! Execution backends for the integration phase.
//!
//! Only integration differs between backends. Constraint relaxation has a
//! sequential data dependency between passes (each pass reads positions the
//! previous constraint just wrote), so it always runs as a host loop after
//! the integration dispatch has completed.

use crate::float::Float;
use crate::integrator::Integration;
use crate::particle::Particle;
use crate::vec::Vec3;
use alloc::boxed::Box;

/// Which backend a body ended up on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Data-parallel dispatch over a worker pool.
    Batch,
    /// Plain loop on the calling thread.
    Sequential,
}

/// Runs the integration kernel over a body's particles.
///
/// Implementations must have finished writing every particle when
/// `integrate` returns; the constraint phase reads the slice right after.
pub trait ExecutionBackend<F: Float>: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn integrate(&self, particles: &mut [Particle<Vec3<F>>], kernel: &Integration<F>, dt: F);
}

/// Single-threaded fallback.
#[derive(Copy, Clone, Debug, Default)]
pub struct SequentialBackend;

impl<F: Float> ExecutionBackend<F> for SequentialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn integrate(&self, particles: &mut [Particle<Vec3<F>>], kernel: &Integration<F>, dt: F) {
        for p in particles.iter_mut() {
            kernel.apply(p, dt);
        }
    }
}

#[cfg(feature = "parallel")]
pub use batch::BatchBackend;

#[cfg(feature = "parallel")]
mod batch {
    use super::{BackendKind, ExecutionBackend};
    use crate::float::Float;
    use crate::integrator::Integration;
    use crate::particle::Particle;
    use crate::vec::Vec3;
    use rayon::prelude::*;
    use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
    use std::sync::{Arc, OnceLock};

    /// Particles per rayon task; small bodies stay on one worker.
    const MIN_CHUNK: usize = 256;

    /// Worker pool shared by every batch body in the process. Built on first
    /// use; `None` records that building it failed.
    static SHARED_POOL: OnceLock<Option<Arc<ThreadPool>>> = OnceLock::new();

    /// Integrates on a rayon pool.
    ///
    /// `ThreadPool::install` blocks the caller until the dispatch has
    /// finished, which is the synchronisation point before relaxation.
    #[derive(Clone)]
    pub struct BatchBackend {
        pool: Arc<ThreadPool>,
    }

    impl BatchBackend {
        /// Handle to the process-wide pool, or `None` when it could not be
        /// built. The build is attempted once.
        pub fn shared() -> Option<Self> {
            SHARED_POOL
                .get_or_init(|| match build_pool(None) {
                    Ok(pool) => {
                        log::debug!("batch worker pool ready with {} threads", pool.current_num_threads());
                        Some(Arc::new(pool))
                    }
                    Err(err) => {
                        log::warn!("batch worker pool unavailable: {}", err);
                        None
                    }
                })
                .as_ref()
                .map(|pool| BatchBackend { pool: Arc::clone(pool) })
        }

        /// A backend on its own pool of `threads` workers.
        pub fn with_threads(threads: usize) -> Result<Self, ThreadPoolBuildError> {
            Ok(BatchBackend { pool: Arc::new(build_pool(Some(threads))?) })
        }

        pub fn threads(&self) -> usize {
            self.pool.current_num_threads()
        }

        /// Whether both handles dispatch to the same worker pool.
        pub fn shares_pool_with(&self, other: &BatchBackend) -> bool {
            Arc::ptr_eq(&self.pool, &other.pool)
        }
    }

    fn build_pool(threads: Option<usize>) -> Result<ThreadPool, ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("pliant-integrate-{}", i));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        builder.build()
    }

    impl<F: Float> ExecutionBackend<F> for BatchBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Batch
        }

        fn integrate(&self, particles: &mut [Particle<Vec3<F>>], kernel: &Integration<F>, dt: F) {
            self.pool.install(|| {
                particles
                    .par_iter_mut()
                    .with_min_len(MIN_CHUNK)
                    .for_each(|p| kernel.apply(p, dt));
            });
        }
    }
}

/// Resolve the backend once, at body construction.
///
/// The batch backend is used when the caller reports compute capability, the
/// `parallel` feature is compiled in and the worker pool can be created.
/// Anything else falls back to [`SequentialBackend`] with a warning; the
/// simulation behaves the same either way.
pub fn select_backend<F: Float>(compute_capable: bool) -> Box<dyn ExecutionBackend<F>> {
    if !compute_capable {
        log::debug!("compute capability not reported; using sequential backend");
        return Box::new(SequentialBackend);
    }

    #[cfg(feature = "parallel")]
    {
        match BatchBackend::shared() {
            Some(backend) => Box::new(backend),
            None => {
                log::warn!("falling back to sequential backend");
                Box::new(SequentialBackend)
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        log::warn!("batch backend not compiled in (feature `parallel` disabled); falling back to sequential");
        Box::new(SequentialBackend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::Vec;

    fn particles(n: usize) -> alloc::vec::Vec<Particle<Vec3<f32>>> {
        (0..n)
            .map(|i| {
                let x = i as f32 * 0.1;
                let mut p = Particle::new(Vec3::new(x, 0.0, -x), 1.0);
                p.prev_pos = Vec3::new(x - 0.01, 0.0, -x);
                p
            })
            .collect()
    }

    #[test]
    fn sequential_selected_without_capability() {
        let backend = select_backend::<f32>(false);
        assert_eq!(backend.kind(), BackendKind::Sequential);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn batch_matches_sequential() {
        let kernel = Integration::Verlet { acceleration: Vec3::new(0.0, -9.8, 0.0), damping: 0.99 };
        let mut a = particles(1000);
        let mut b = a.clone();
        let batch = BatchBackend::with_threads(2).unwrap();
        for _ in 0..20 {
            ExecutionBackend::<f32>::integrate(&batch, &mut a, &kernel, 1.0 / 60.0);
            ExecutionBackend::<f32>::integrate(&SequentialBackend, &mut b, &kernel, 1.0 / 60.0);
        }
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert!(pa.pos.distance(pb.pos) < 1e-6);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn bodies_share_one_worker_pool() {
        let first = BatchBackend::shared().unwrap();
        let second = BatchBackend::shared().unwrap();
        assert!(first.shares_pool_with(&second));
        let dedicated = BatchBackend::with_threads(1).unwrap();
        assert!(!first.shares_pool_with(&dedicated));
        for _ in 0..16 {
            assert_eq!(select_backend::<f32>(true).kind(), BackendKind::Batch);
        }
    }
}
