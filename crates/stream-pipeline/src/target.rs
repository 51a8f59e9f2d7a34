//! Inference execution target

use serde::{Deserialize, Serialize};

/// Where the tensor filter runs the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionTarget {
    /// Plain CPU inference
    Cpu,
    /// Ethos-U NPU through the external delegate
    #[default]
    Npu,
}

impl ExecutionTarget {
    /// Target selected by the `--cpu` flag
    pub fn from_cpu_flag(cpu: bool) -> Self {
        if cpu {
            ExecutionTarget::Cpu
        } else {
            ExecutionTarget::Npu
        }
    }

    /// Model file name; the NPU build is compiled with vela
    pub fn model_file(&self) -> &'static str {
        match self {
            ExecutionTarget::Cpu => "mobilenet_v1_1.0_224_quant.tflite",
            ExecutionTarget::Npu => "mobilenet_v1_1.0_224_quant_vela.tflite",
        }
    }

    /// Value of the tensor filter `accelerator` property
    pub fn accelerator(&self) -> &'static str {
        match self {
            ExecutionTarget::Cpu => "false",
            ExecutionTarget::Npu => "true:npu",
        }
    }

    /// External delegate library, if any
    pub fn delegate(&self) -> Option<&'static str> {
        match self {
            ExecutionTarget::Cpu => None,
            ExecutionTarget::Npu => Some("libethosu_delegate.so"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_flag() {
        assert_eq!(ExecutionTarget::from_cpu_flag(true), ExecutionTarget::Cpu);
        assert_eq!(ExecutionTarget::from_cpu_flag(false), ExecutionTarget::Npu);
    }

    #[test]
    fn test_cpu_has_no_delegate() {
        let cpu = ExecutionTarget::Cpu;
        assert_eq!(cpu.accelerator(), "false");
        assert_eq!(cpu.delegate(), None);
        assert!(!cpu.model_file().contains("vela"));
    }

    #[test]
    fn test_npu_uses_ethosu() {
        let npu = ExecutionTarget::Npu;
        assert_eq!(npu.accelerator(), "true:npu");
        assert_eq!(npu.delegate(), Some("libethosu_delegate.so"));
        assert!(npu.model_file().ends_with("_vela.tflite"));
    }
}
