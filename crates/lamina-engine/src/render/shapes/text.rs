use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

use super::common::{create_quad_pipeline, draw_clipped, InstancedQuads, ViewportUniform};

const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1;

/// Shelf packer for the glyph atlas. Glyphs are never evicted.
#[derive(Debug)]
struct ShelfPacker {
    size: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl ShelfPacker {
    fn new(size: u32) -> Self {
        Self {
            size,
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
            full: false,
        }
    }

    /// Reserves a `w × h` cell and returns its top-left corner.
    ///
    /// A glyph larger than the padded atlas is refused without marking the
    /// atlas full.
    fn allocate(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full || w + 2 * GLYPH_PADDING > self.size || h + 2 * GLYPH_PADDING > self.size {
            return None;
        }

        if self.cursor_x + w + GLYPH_PADDING > self.size {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        if self.cursor_y + h + GLYPH_PADDING > self.size {
            self.full = true;
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

#[derive(Debug, Copy, Clone)]
struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// Renderer for `DrawCmd::Text`.
///
/// Glyphs are rasterized with fontdue on first use and cached in an R8 atlas
/// keyed by `GlyphRasterConfig` (font, glyph, pixel size). Rasterization
/// happens at physical size so text stays sharp on HiDPI displays.
pub struct TextRenderer {
    gpu: Option<TextGpu>,
    packer: ShelfPacker,
    glyph_cache: HashMap<GlyphRasterConfig, CachedGlyph>,
    warned_no_space: bool,

    layout: Layout<()>,
    instances: Vec<GlyphInstance>,
    clips: Vec<Option<Rect>>,
}

struct TextGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,
    atlas: wgpu::Texture,
    quads: InstancedQuads,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            gpu: None,
            packer: ShelfPacker::new(ATLAS_SIZE),
            glyph_cache: HashMap::new(),
            warned_no_space: false,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            instances: Vec::new(),
            clips: Vec::new(),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every text run in `draw_list` over the current frame contents.
    /// Runs referring to unknown fonts are skipped.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        font_system: &FontSystem,
    ) {
        if self.gpu.as_ref().is_none_or(|g| g.format != ctx.surface_format) {
            // A new atlas texture starts empty.
            self.gpu = Some(TextGpu::new(ctx));
            self.packer = ShelfPacker::new(ATLAS_SIZE);
            self.glyph_cache.clear();
        }
        let Some(gpu) = self.gpu.as_mut() else { return };

        self.instances.clear();
        self.clips.clear();
        let scale = ctx.scale_factor.max(f32::EPSILON);

        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Text(cmd) = &item.cmd else { continue };
            let Some(font) = font_system.get(cmd.font) else {
                log::warn!("TextRenderer: unknown font {:?}, skipping", cmd.font);
                continue;
            };

            // Lay out in physical pixels, then map back to logical.
            self.layout.reset(&LayoutSettings {
                x: (cmd.origin.x * scale).round(),
                y: (cmd.origin.y * scale).round(),
                ..LayoutSettings::default()
            });
            self.layout.append(&[font], &TextStyle::new(&cmd.text, cmd.size * scale, 0));

            let color = cmd.color.to_array();

            for g in self.layout.glyphs() {
                if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                    continue;
                }

                let cached = match self.glyph_cache.get(&g.key) {
                    Some(c) => *c,
                    None => {
                        let (metrics, bitmap) = font.rasterize_config(g.key);
                        let (w, h) = (metrics.width as u32, metrics.height as u32);
                        if w == 0 || h == 0 {
                            continue;
                        }
                        let Some((x, y)) = self.packer.allocate(w, h) else {
                            if !self.warned_no_space {
                                log::warn!(
                                    "TextRenderer: glyph does not fit the {ATLAS_SIZE}x{ATLAS_SIZE} \
                                     atlas; some glyphs will not be drawn"
                                );
                                self.warned_no_space = true;
                            }
                            continue;
                        };
                        gpu.upload_glyph(ctx.queue, &bitmap, x, y, w, h);

                        let atlas = ATLAS_SIZE as f32;
                        let entry = CachedGlyph {
                            uv_min: [x as f32 / atlas, y as f32 / atlas],
                            uv_max: [(x + w) as f32 / atlas, (y + h) as f32 / atlas],
                        };
                        self.glyph_cache.insert(g.key, entry);
                        entry
                    }
                };

                self.instances.push(GlyphInstance {
                    dst_min: [g.x / scale, g.y / scale],
                    dst_max: [(g.x + g.width as f32) / scale, (g.y + g.height as f32) / scale],
                    uv_min: cached.uv_min,
                    uv_max: cached.uv_max,
                    color,
                });
                self.clips.push(item.clip_rect);
            }
        }

        if self.instances.is_empty() {
            return;
        }

        ctx.queue.write_buffer(
            &gpu.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform::from_viewport(ctx.viewport)),
        );
        gpu.quads.upload(ctx.device, ctx.queue, &self.instances);

        let mut rpass = target.begin_overlay_pass("lamina text pass");
        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        gpu.quads.bind(&mut rpass);
        draw_clipped(&mut rpass, &self.clips, ctx.viewport, ctx.scale_factor);
    }
}

impl TextGpu {
    fn new(ctx: &RenderCtx<'_>) -> Self {
        log::debug!("creating text pipeline for {:?}", ctx.surface_format);
        let device = ctx.device;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lamina text bgl"),
            entries: &[
                ViewportUniform::layout_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = create_quad_pipeline(
            device,
            ctx.surface_format,
            "lamina text pipeline",
            include_str!("shaders/text.wgsl"),
            &bind_group_layout,
            GlyphInstance::layout(),
        );

        let atlas = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lamina text atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let atlas_view = atlas.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lamina text sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lamina text viewport ubo"),
            size: ViewportUniform::SIZE.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lamina text bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            format: ctx.surface_format,
            pipeline,
            bind_group,
            viewport_ubo,
            atlas,
            quads: InstancedQuads::new(device, "lamina text quads"),
        }
    }

    fn upload_glyph(&self, queue: &wgpu::Queue, bitmap: &[u8], x: u32, y: u32, w: u32, h: u32) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.atlas,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );
    }
}

/// Per-glyph instance (48 bytes): destination rect in logical pixels, atlas
/// UV rect, premultiplied color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packer_fills_rows_left_to_right() {
        let mut p = ShelfPacker::new(32);
        assert_eq!(p.allocate(10, 8), Some((1, 1)));
        assert_eq!(p.allocate(10, 5), Some((12, 1)));
        // Does not fit in the remaining width: next shelf starts below the tallest glyph.
        assert_eq!(p.allocate(10, 4), Some((1, 10)));
    }

    #[test]
    fn packer_reports_full_and_stays_full() {
        let mut p = ShelfPacker::new(16);
        assert_eq!(p.allocate(14, 14), Some((1, 1)));
        assert_eq!(p.allocate(2, 2), None);
        assert_eq!(p.allocate(1, 1), None);
    }

    #[test]
    fn oversized_glyph_is_refused_without_filling_the_atlas() {
        let mut p = ShelfPacker::new(16);
        // 15 + 2 px padding exceeds 16 in either direction.
        assert_eq!(p.allocate(15, 4), None);
        assert_eq!(p.allocate(4, 15), None);
        assert_eq!(p.allocate(14, 14), Some((1, 1)));
    }

    #[test]
    fn glyph_instance_is_48_bytes() {
        assert_eq!(size_of::<GlyphInstance>(), 48);
    }
}
