use crate::content::image::Image;
use crate::content::locator::ResourceLocator;
use crate::content::parameters::Parameters;
use crate::content::scene::{PaintInputs, SceneDocument, SceneEffect, Snapshot, paint};
use crate::content::{Content, ContentFactory, ImageType, ImageTypeMap, RenderRequest};
use crate::foundation::core::Size;
use crate::foundation::error::{VfxError, VfxResult};
use crate::service::handshake::RenderCompletion;
use std::collections::HashMap;
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

/// Creates [`SceneContent`] engines.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneContentFactory;

impl ContentFactory for SceneContentFactory {
    fn create_content(
        &self,
        size: Size,
        parameters: Arc<dyn Parameters>,
    ) -> VfxResult<Box<dyn Content>> {
        Ok(Box::new(SceneContent::new(size, parameters)?))
    }
}

struct PaintJob {
    effect: SceneEffect,
    time: f64,
    source: Option<Image>,
    target_image: Option<Image>,
    output: Image,
    completion: RenderCompletion,
}

impl PaintJob {
    fn run(self) {
        let PaintJob {
            effect,
            time,
            source,
            target_image,
            output,
            completion,
        } = self;
        let inputs = PaintInputs {
            time,
            source: source.as_ref().map(snapshot),
            target: target_image.as_ref().map(snapshot),
        };
        // Inputs are copied; let go of the shared buffers before signalling.
        drop((source, target_image));

        let size = output.dimensions();
        let format = output.format();
        let painted = output
            .pixels_mut()
            .and_then(|mut dst| paint(&effect, &inputs, &mut dst, size, format));
        drop(output);

        match painted {
            Ok(()) => {
                completion.complete();
            }
            Err(err) => {
                tracing::debug!(error = %err, "scene paint failed");
                completion.fail(err.to_string());
            }
        }
    }
}

fn snapshot(image: &Image) -> Snapshot {
    Snapshot {
        bytes: image.snapshot(),
        size: image.dimensions(),
        format: image.format(),
    }
}

/// CPU content engine that paints [`SceneDocument`]s on its own worker thread.
///
/// Renders complete asynchronously: `render_content` queues a job and returns, the worker
/// fires the completion when the frame is painted. Inputs are copied before painting, so the
/// output may share its buffer with the source slot.
pub struct SceneContent {
    size: Size,
    document: Option<SceneDocument>,
    images: HashMap<String, Image>,
    parameters: Arc<dyn Parameters>,
    jobs: Option<mpsc::Sender<PaintJob>>,
    worker: Option<JoinHandle<()>>,
}

impl SceneContent {
    /// Start an engine of `size`.
    pub fn new(size: Size, parameters: Arc<dyn Parameters>) -> VfxResult<Self> {
        if size.is_empty() {
            return Err(VfxError::content(format!(
                "scene content size must be non-empty, got {size}"
            )));
        }
        let (tx, rx) = mpsc::channel::<PaintJob>();
        let worker = std::thread::Builder::new()
            .name("webvfx-scene".to_string())
            .spawn(move || {
                for job in rx {
                    job.run();
                }
            })
            .map_err(|e| VfxError::content(format!("spawn scene engine thread: {e}")))?;
        Ok(Self {
            size,
            document: None,
            images: HashMap::new(),
            parameters,
            jobs: Some(tx),
            worker: Some(worker),
        })
    }

    fn effect(&self, document: &SceneDocument) -> SceneEffect {
        match document.effect {
            SceneEffect::Fill { color } => SceneEffect::Fill {
                color: parse_color(&self.parameters.string("color")).unwrap_or(color),
            },
            ref other => other.clone(),
        }
    }
}

/// Parse `r,g,b[,a]` into straight RGBA.
fn parse_color(s: &str) -> Option<[u8; 4]> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some([*r, *g, *b, 255]),
        [r, g, b, a] => Some([*r, *g, *b, *a]),
        _ => None,
    }
}

impl Content for SceneContent {
    fn load_content(&mut self, locator: &ResourceLocator) -> VfxResult<()> {
        let text = locator.read_to_string()?;
        let document = SceneDocument::parse(&text)?;
        tracing::debug!(resource = %locator, effect = ?document.effect, "scene loaded");
        self.document = Some(document);
        self.images.clear();
        Ok(())
    }

    fn content_size(&self) -> Size {
        self.size
    }

    fn set_content_size(&mut self, size: Size) -> VfxResult<()> {
        if size.is_empty() {
            return Err(VfxError::content(format!(
                "scene content size must be non-empty, got {size}"
            )));
        }
        self.size = size;
        Ok(())
    }

    fn image_type_map(&self) -> ImageTypeMap {
        self.document
            .as_ref()
            .map(SceneDocument::image_type_map)
            .unwrap_or_default()
    }

    fn set_image(&mut self, name: &str, image: Option<Image>) {
        match image {
            Some(image) => {
                self.images.insert(name.to_string(), image);
            }
            None => {
                self.images.remove(name);
            }
        }
    }

    fn render_content(&mut self, request: RenderRequest, completion: RenderCompletion) {
        let Some(document) = self.document.as_ref() else {
            completion.fail("no scene loaded");
            return;
        };
        let slot = |ty| {
            document
                .slot_name(ty)
                .and_then(|name| self.images.get(&name).cloned())
        };
        let job = PaintJob {
            effect: self.effect(document),
            time: request.time,
            source: slot(ImageType::Source),
            target_image: slot(ImageType::Target),
            output: request.target,
            completion,
        };

        let Some(jobs) = self.jobs.as_ref() else {
            job.completion.fail("scene engine stopped");
            return;
        };
        if let Err(mpsc::SendError(job)) = jobs.send(job) {
            job.completion.fail("scene engine stopped");
        }
    }
}

impl Drop for SceneContent {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("scene engine thread panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/builtin.rs"]
mod tests;
