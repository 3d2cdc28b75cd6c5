//! Bind group plumbing shared by the compute and render pipelines.

use wgpu::{BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, Device, ShaderStages};

/// Storage buffer slot visible to `stages`
pub fn storage_entry(binding: u32, stages: ShaderStages, read_only: bool) -> BindGroupLayoutEntry {
    buffer_entry(binding, stages, BufferBindingType::Storage { read_only })
}

/// Uniform buffer slot visible to `stages`
pub fn uniform_entry(binding: u32, stages: ShaderStages) -> BindGroupLayoutEntry {
    buffer_entry(binding, stages, BufferBindingType::Uniform)
}

fn buffer_entry(binding: u32, visibility: ShaderStages, ty: BufferBindingType) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind `buffers` to consecutive slots starting at 0
pub fn bind_buffers(
    device: &Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffers: &[&Buffer],
) -> wgpu::BindGroup {
    let entries: Vec<wgpu::BindGroupEntry> = buffers
        .iter()
        .enumerate()
        .map(|(slot, buffer)| wgpu::BindGroupEntry {
            binding: slot as u32,
            resource: buffer.as_entire_binding(),
        })
        .collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

/// Layout plus pipeline layout for a single bind group
pub fn single_group_layout(
    device: &Device,
    label: &str,
    entries: &[BindGroupLayoutEntry],
) -> (wgpu::BindGroupLayout, wgpu::PipelineLayout) {
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries,
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    (bind_group_layout, pipeline_layout)
}
