//! GStreamer backend
//!
//! Launches the pipeline, feeds every tensor delivered by the tensor sink into
//! the classification context and forwards bus messages to the session.

use classification::ClassificationContext;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::description::{OVERLAY_ELEMENT, TENSOR_SINK_ELEMENT};
use crate::events::PipelineEvent;
use crate::overlay::OverlaySink;
use crate::session::Session;
use crate::PipelineError;

/// Bus poll period; the forwarding thread checks for session shutdown this often
const BUS_POLL_MS: u64 = 100;

/// `textoverlay` element driven by the refresh session
pub struct TextOverlay(gst::Element);

impl OverlaySink for TextOverlay {
    fn set_text(&self, text: &str) {
        self.0.set_property("text", text);
    }
}

/// A running GStreamer pipeline
pub struct GstPipeline {
    pipeline: gst::Pipeline,
    bus_thread: Option<JoinHandle<()>>,
}

impl GstPipeline {
    /// Parse and start `description`, wiring the tensor sink to `context`.
    ///
    /// Returns the pipeline, its overlay element and the bus event receiver.
    pub fn launch(
        description: &str,
        context: Arc<ClassificationContext>,
    ) -> Result<(Self, TextOverlay, mpsc::Receiver<PipelineEvent>), PipelineError> {
        gst::init().map_err(|e| PipelineError::Init(e.to_string()))?;

        debug!("Launching pipeline: {}", description);
        let pipeline = gst::parse::launch(description)
            .map_err(|e| PipelineError::Launch(e.to_string()))?
            .downcast::<gst::Pipeline>()
            .map_err(|_| PipelineError::Launch("top-level element is not a pipeline".to_string()))?;

        let overlay = pipeline
            .by_name(OVERLAY_ELEMENT)
            .ok_or(PipelineError::MissingElement(OVERLAY_ELEMENT))?;
        let tensor_sink = pipeline
            .by_name(TENSOR_SINK_ELEMENT)
            .ok_or(PipelineError::MissingElement(TENSOR_SINK_ELEMENT))?;

        tensor_sink.connect("new-data", false, move |values| {
            let buffer = values.get(1).and_then(|v| v.get::<gst::Buffer>().ok());
            if let Some(buffer) = buffer {
                for memory in buffer.iter_memories() {
                    match memory.map_readable() {
                        Ok(map) => context.submit_tensor(map.as_slice()),
                        Err(err) => warn!("Failed to map tensor memory: {}", err),
                    }
                }
            }
            None
        });

        let bus = pipeline
            .bus()
            .ok_or(PipelineError::MissingElement("bus"))?;
        let (tx, rx) = Session::channel();
        let bus_thread = thread::Builder::new()
            .name("gst-bus".to_string())
            .spawn(move || forward_bus(bus, tx))
            .map_err(|e| PipelineError::Init(e.to_string()))?;

        let mut launched = Self {
            pipeline,
            bus_thread: Some(bus_thread),
        };
        if let Err(err) = launched.pipeline.set_state(gst::State::Playing) {
            launched.stop();
            return Err(PipelineError::StateChange(err.to_string()));
        }
        info!("Pipeline playing");

        Ok((launched, TextOverlay(overlay), rx))
    }

    /// Set the pipeline to Null and wait for the bus thread
    pub fn shutdown(mut self) -> Result<(), PipelineError> {
        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| PipelineError::StateChange(e.to_string()))?;
        if let Some(handle) = self.bus_thread.take() {
            let _ = handle.join();
        }
        info!("Pipeline stopped");
        Ok(())
    }

    fn stop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

fn forward_bus(bus: gst::Bus, events: mpsc::Sender<PipelineEvent>) {
    while !events.is_closed() {
        let Some(message) = bus.timed_pop(gst::ClockTime::from_mseconds(BUS_POLL_MS)) else {
            continue;
        };
        let Some(event) = translate(&message) else {
            continue;
        };

        let terminal = event.termination().is_some();
        if events.blocking_send(event).is_err() || terminal {
            break;
        }
    }
    debug!("Bus forwarding stopped");
}

fn translate(message: &gst::Message) -> Option<PipelineEvent> {
    use gst::MessageView;

    match message.view() {
        MessageView::Eos(..) => Some(PipelineEvent::EndOfStream),
        MessageView::Error(err) => Some(PipelineEvent::Error {
            message: err.error().to_string(),
            debug: err.debug().map(|d| d.to_string()),
        }),
        MessageView::Warning(warning) => Some(PipelineEvent::Warning {
            message: warning.error().to_string(),
            debug: warning.debug().map(|d| d.to_string()),
        }),
        MessageView::StreamStart(..) => Some(PipelineEvent::StreamStarted),
        MessageView::Qos(qos) => {
            let (processed, dropped) = qos.stats();
            Some(PipelineEvent::Qos {
                format: format!("{:?}", processed.format()),
                processed: processed.value().max(0) as u64,
                dropped: dropped.value().max(0) as u64,
            })
        }
        _ => None,
    }
}
