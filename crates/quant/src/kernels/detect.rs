//! One-shot CPU feature detection.

use std::sync::OnceLock;

static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Wide-instruction support relevant to the kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatures {
    pub has_avx2: bool,
    pub has_fma: bool,
    pub has_neon: bool,
}

impl CpuFeatures {
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                has_avx2: is_x86_feature_detected!("avx2"),
                has_fma: is_x86_feature_detected!("fma"),
                has_neon: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self {
                has_avx2: false,
                has_fma: false,
                has_neon: std::arch::is_aarch64_feature_detected!("neon"),
            }
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {
                has_avx2: false,
                has_fma: false,
                has_neon: false,
            }
        }
    }

    /// AVX2 kernels need both AVX2 and FMA.
    pub fn avx2_usable(&self) -> bool {
        self.has_avx2 && self.has_fma
    }
}

/// Detected features, computed on first call.
pub fn cpu_features() -> &'static CpuFeatures {
    CPU_FEATURES.get_or_init(CpuFeatures::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_stable() {
        let first = *cpu_features();
        assert_eq!(first, CpuFeatures::detect());
        assert!(!(first.has_avx2 && first.has_neon));
    }
}
