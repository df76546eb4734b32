use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{LyricError, LyricResult};
use crate::render::FrameRgb;
use crate::render::frame::FrameRenderer;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, mpsc};

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSessionOpts {
    /// Render frames in parallel on a dedicated rayon pool, one renderer per worker.
    pub parallel: bool,
    /// Frames per render chunk; elision and reordering work chunk by chunk.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Reuse a rendered frame when another frame in the chunk has the same visible state.
    pub static_frame_elision: bool,
    /// Bounded channel capacity between render workers and the sink thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames actually rendered (fewer than total when elision kicks in).
    pub frames_rendered: u64,
    /// Frames reused through static-frame elision.
    pub frames_elided: u64,
}

/// Drives a [`FrameRenderer`] over frame ranges and streams the frames into a sink.
pub struct RenderSession {
    renderer: FrameRenderer,
    opts: RenderSessionOpts,
}

impl RenderSession {
    /// Session driving `renderer` with `opts`.
    pub fn new(renderer: FrameRenderer, opts: RenderSessionOpts) -> Self {
        Self { renderer, opts }
    }

    /// The renderer used for sequential rendering.
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Render a single frame into an owned buffer.
    pub fn render_frame(&mut self, frame: FrameIndex) -> LyricResult<FrameRgb> {
        self.renderer.render_frame_index(frame).cloned()
    }

    /// Render `range` and stream it into `sink`.
    ///
    /// The sink sees frames in strictly increasing index order even when workers finish out of
    /// order.
    #[tracing::instrument(skip(self, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> LyricResult<RenderStats> {
        if range.is_empty() {
            return Err(LyricError::validation("render_range range must be non-empty"));
        }

        let canvas = self.renderer.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.renderer.fps(),
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = (canvas.rgb_len() as u64).max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = (self.opts.chunk_size.max(1) as u64)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        let elide = self.opts.static_frame_elision;
        let renderer = &mut self.renderer;

        std::thread::scope(|scope| -> LyricResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> LyricResult<()> {
                sink_ref.begin(cfg)?;

                let mut next = range_start;
                let mut pending = HashMap::<u64, Arc<FrameRgb>>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        sink_ref.push_frame(FrameIndex(next), &frame)?;
                        next += 1;
                        continue;
                    }
                    let msg = rx
                        .recv()
                        .map_err(|_| LyricError::render("sink channel disconnected unexpectedly"))?;
                    pending.insert(msg.idx.0, msg.frame);
                }

                sink_ref.end()
            });

            let mut stats = RenderStats::default();
            let mut sink_hung_up = false;
            let produce_res = (|| -> LyricResult<()> {
                let mut chunk_start = range_start;
                while chunk_start < range_end {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    let chunk = match pool.as_ref() {
                        Some(pool) => {
                            render_chunk_parallel(renderer, pool, chunk_start, chunk_end, elide)?
                        }
                        None => render_chunk_sequential(renderer, chunk_start, chunk_end, elide)?,
                    };
                    for (i, f) in (chunk_start..chunk_end).enumerate() {
                        let msg = FrameMsg {
                            idx: FrameIndex(f),
                            frame: chunk.frames[chunk.frame_to_unique[i]].clone(),
                        };
                        if tx.send(msg).is_err() {
                            sink_hung_up = true;
                            return Err(LyricError::render("sink thread is not accepting frames"));
                        }
                    }
                    stats.frames_total += chunk_end - chunk_start;
                    stats.frames_rendered += chunk.frames.len() as u64;
                    stats.frames_elided += (chunk_end - chunk_start) - chunk.frames.len() as u64;
                    chunk_start = chunk_end;
                }
                Ok(())
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| LyricError::render("sink thread panicked"))?;

            // A sink failure closes the channel; report the sink's own error in that case.
            match (produce_res, enc_res) {
                (Err(_), Err(sink_err)) if sink_hung_up => return Err(sink_err),
                (Err(e), _) | (Ok(()), Err(e)) => return Err(e),
                (Ok(()), Ok(())) => {}
            }
            tracing::debug!(
                rendered = stats.frames_rendered,
                elided = stats.frames_elided,
                "range rendered"
            );
            Ok(stats)
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Arc<FrameRgb>,
}

/// Rendered frames of one chunk plus the mapping from chunk position to frame.
struct ChunkFrames {
    frames: Vec<Arc<FrameRgb>>,
    frame_to_unique: Vec<usize>,
}

/// Frames of `[start, end)` to actually render, and which of them each frame reuses.
fn plan_chunk(
    renderer: &FrameRenderer,
    start: u64,
    end: u64,
    elide: bool,
) -> (Vec<u64>, Vec<usize>) {
    if !elide {
        let frames: Vec<u64> = (start..end).collect();
        let map = (0..frames.len()).collect();
        return (frames, map);
    }

    let fps = renderer.fps();
    let mut uniq = Vec::<u64>::new();
    let mut map = Vec::<usize>::with_capacity((end - start) as usize);
    let mut seen = HashMap::<u64, usize>::new();
    for f in start..end {
        let fp = renderer.frame_fingerprint(fps.frame_to_secs(FrameIndex(f)));
        let u = *seen.entry(fp).or_insert_with(|| {
            uniq.push(f);
            uniq.len() - 1
        });
        map.push(u);
    }
    (uniq, map)
}

fn render_chunk_sequential(
    renderer: &mut FrameRenderer,
    start: u64,
    end: u64,
    elide: bool,
) -> LyricResult<ChunkFrames> {
    let (uniq, frame_to_unique) = plan_chunk(renderer, start, end, elide);
    let frames = uniq
        .iter()
        .map(|&f| {
            renderer
                .render_frame_index(FrameIndex(f))
                .map(|frame| Arc::new(frame.clone()))
        })
        .collect::<LyricResult<Vec<_>>>()?;
    Ok(ChunkFrames {
        frames,
        frame_to_unique,
    })
}

fn render_chunk_parallel(
    renderer: &FrameRenderer,
    pool: &rayon::ThreadPool,
    start: u64,
    end: u64,
    elide: bool,
) -> LyricResult<ChunkFrames> {
    let (uniq, frame_to_unique) = plan_chunk(renderer, start, end, elide);
    let rendered = pool.install(|| {
        uniq.par_iter()
            .map_init(
                || renderer.clone(),
                |worker, &f| -> LyricResult<Arc<FrameRgb>> {
                    let frame = worker.render_frame_index(FrameIndex(f))?;
                    Ok(Arc::new(frame.clone()))
                },
            )
            .collect::<LyricResult<Vec<_>>>()
    })?;
    Ok(ChunkFrames {
        frames: rendered,
        frame_to_unique,
    })
}

fn build_thread_pool(threads: Option<usize>) -> LyricResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LyricError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LyricError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
