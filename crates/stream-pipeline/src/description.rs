//! Pipeline launch description
//!
//! Camera frames are split by a tee: one branch goes through the text overlay
//! to the display, the other is scaled to the model input and fed through the
//! tensor filter into the tensor sink.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::target::ExecutionTarget;

/// Name of the text overlay element
pub const OVERLAY_ELEMENT: &str = "overlay";
/// Name of the tensor sink element emitting `new-data`
pub const TENSOR_SINK_ELEMENT: &str = "tensor_sink";

/// Pipeline layout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// V4L2 device; the source default is used when unset
    pub camera_device: Option<String>,
    /// Display branch width
    pub display_width: u32,
    /// Display branch height
    pub display_height: u32,
    /// Model input width
    pub tensor_width: u32,
    /// Model input height
    pub tensor_height: u32,
    /// Hardware video converter element
    pub converter: String,
    /// Overlay font description
    pub font: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera_device: None,
            display_width: 640,
            display_height: 480,
            tensor_width: 224,
            tensor_height: 224,
            converter: "imxvideoconvert_pxp".to_string(),
            font: "Sans, 26".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Render the launch description for `model_path` on `target`
    pub fn describe(&self, model_path: &Path, target: ExecutionTarget) -> String {
        let device = self
            .camera_device
            .as_ref()
            .map(|d| format!(" device={}", d))
            .unwrap_or_default();
        let delegate = target
            .delegate()
            .map(|lib| format!(" custom=Delegate:External,ExtDelegateLib:{}", lib))
            .unwrap_or_default();

        [
            format!(
                "v4l2src name=cam_src{device} ! {conv} ! \
                 video/x-raw,width={w},height={h},format=BGRx ! tee name=t_raw",
                conv = self.converter,
                w = self.display_width,
                h = self.display_height,
            ),
            format!(
                "t_raw. ! queue ! textoverlay name={OVERLAY_ELEMENT} font-desc=\"{font}\" ! \
                 {conv} ! fpsdisplaysink name=img_tensor sync=false",
                font = self.font,
                conv = self.converter,
            ),
            format!(
                "t_raw. ! queue ! {conv} ! video/x-raw,width={w},height={h} ! \
                 videoconvert ! video/x-raw,format=RGB ! tensor_converter ! \
                 tensor_filter framework=tensorflow-lite model=\"{model}\" accelerator={accel}{delegate} ! \
                 tensor_sink name={TENSOR_SINK_ELEMENT}",
                conv = self.converter,
                w = self.tensor_width,
                h = self.tensor_height,
                model = model_path.display(),
                accel = target.accelerator(),
            ),
        ]
        .join(" ")
    }
}
