use crate::gpu::lighting::CascadedShadowMaps;
use crate::gpu::scene::Scene;

/// Shadow pass — глубина сцены в каждый активный слой карты теней
pub fn render(encoder: &mut wgpu::CommandEncoder, shadows: &CascadedShadowMaps, scene: &Scene) {
    for (layer, (view, pass_bind_group)) in shadows.active_passes().enumerate() {
        let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&format!("Shadow Pass {}", layer)),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        shadow_pass.set_pipeline(shadows.pipeline());
        shadow_pass.set_bind_group(0, pass_bind_group, &[]);

        for renderable in scene.iter() {
            shadow_pass.set_bind_group(1, &renderable.bind_group, &[]);
            renderable.mesh.draw(&mut shadow_pass);
        }
    }
}
