use crate::gpu::animation::AnimatedTexture;
use crate::gpu::lighting::CascadedShadowMaps;
use crate::gpu::render::renderer::core::RenderComponents;
use crate::gpu::scene::Scene;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.45,
    g: 0.6,
    b: 0.8,
    a: 1.0,
};

/// Main 3D pass — основной рендеринг сцены
pub fn render(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    components: &RenderComponents,
    shadows: &CascadedShadowMaps,
    animated: &AnimatedTexture,
    scene: &Scene,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Main Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &components.depth_texture,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    render_pass.set_pipeline(&components.pipelines.scene);
    render_pass.set_bind_group(0, &components.frame.bind_group, &[]);
    render_pass.set_bind_group(1, shadows.bind_group(), &[]);

    for renderable in scene.iter() {
        render_pass.set_bind_group(2, &renderable.bind_group, &[]);
        render_pass.set_bind_group(3, animated.overlay_bind_group(renderable.overlay.map(|o| o.layer)), &[]);
        renderable.mesh.draw(&mut render_pass);
    }
}
