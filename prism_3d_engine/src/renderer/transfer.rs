/// BufferTransferEngine - staging uploads into device-local buffers.
///
/// Every upload goes through a transient host-visible staging buffer and a
/// one-shot copy command. The call blocks until the device is idle, so the
/// staging buffer never outlives the call that created it.

use crate::error::{Error, Result};
use crate::graphics_device::{
    align_size, find_memory_type, BufferHandle, BufferUsageFlags, GpuBuffer, GraphicsDevice,
    MemoryHandle, MemoryPropertyFlags,
};
use crate::scene::{Scene, Vertex};
use crate::{engine_debug, engine_error};

/// Staging buffer and destination buffer of one in-flight upload
///
/// Lives only inside [`BufferTransferEngine::upload_to_device`]. The staging
/// half is released on every exit path; the destination is released too when
/// the upload fails.
#[derive(Debug, Default)]
pub struct StagingTransfer {
    staging: GpuBuffer,
    destination: GpuBuffer,
}

impl StagingTransfer {
    pub fn staging(&self) -> &GpuBuffer {
        &self.staging
    }

    pub fn destination(&self) -> &GpuBuffer {
        &self.destination
    }

    /// Release the staging buffer and hand out the destination
    fn finish(mut self, device: &mut dyn GraphicsDevice) -> GpuBuffer {
        self.staging.release(device);
        self.destination
    }

    /// Release both buffers
    fn abort(mut self, device: &mut dyn GraphicsDevice) {
        self.staging.release(device);
        self.destination.release(device);
    }
}

/// Allocates GPU buffers and moves CPU data into device-local memory
#[derive(Debug, Clone, Copy)]
pub struct BufferTransferEngine {
    alignment: u64,
    readback: bool,
}

impl BufferTransferEngine {
    /// Engine aligning uploads to the device's minimum buffer offset alignment
    pub fn new(device: &dyn GraphicsDevice) -> Self {
        Self::with_alignment(device.limits().min_buffer_offset_alignment)
    }

    pub fn with_alignment(alignment: u64) -> Self {
        Self { alignment: alignment.max(1), readback: false }
    }

    /// Also mark destination buffers as transfer sources so that
    /// [`download_from_device`](Self::download_from_device) can read them back
    pub fn with_readback(mut self) -> Self {
        self.readback = true;
        self
    }

    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Bytes allocated for an upload of `len` bytes
    ///
    /// Empty uploads still get one alignment unit: the device never sees a
    /// zero-sized buffer.
    pub fn allocation_size(&self, len: u64) -> Result<u64> {
        align_size(len.max(1), self.alignment).ok_or_else(|| {
            engine_error!(
                "prism3d::transfer",
                "Upload of {} bytes overflows when aligned to {}",
                len, self.alignment
            );
            Error::InvalidResource(format!("upload of {} bytes is too large", len))
        })
    }

    /// Create a buffer and bind freshly allocated memory with `properties`
    ///
    /// A buffer created before a later step fails is destroyed before the
    /// error is returned.
    pub fn create_general_buffer(
        &self,
        device: &mut dyn GraphicsDevice,
        size: u64,
        usage: BufferUsageFlags,
        properties: MemoryPropertyFlags,
    ) -> Result<GpuBuffer> {
        let buffer = device.create_buffer(size, usage)?;
        match Self::allocate_and_bind(device, buffer, properties) {
            Ok(memory) => Ok(GpuBuffer::new(buffer, memory, size)),
            Err(e) => {
                device.destroy_buffer(buffer);
                Err(e)
            }
        }
    }

    fn allocate_and_bind(
        device: &mut dyn GraphicsDevice,
        buffer: BufferHandle,
        properties: MemoryPropertyFlags,
    ) -> Result<MemoryHandle> {
        let requirements = device.buffer_memory_requirements(buffer)?;
        let type_index = find_memory_type(device.memory_types(), requirements.memory_type_bits, properties)?;
        let memory = device.allocate_memory(requirements.size, type_index)?;
        if let Err(e) = device.bind_buffer_memory(buffer, memory, 0) {
            device.free_memory(memory);
            return Err(e);
        }
        Ok(memory)
    }

    /// Upload `data` into a new device-local buffer with `usage`
    ///
    /// 1. staging buffer (`usage | TRANSFER_SRC`, host visible and coherent)
    /// 2. write the data, zero-padded to the aligned size
    /// 3. destination buffer (`usage | TRANSFER_DST`, device local)
    /// 4. one-shot copy of the whole aligned range, submit, wait idle
    /// 5. release the staging buffer
    pub fn upload_to_device(
        &self,
        device: &mut dyn GraphicsDevice,
        data: &[u8],
        usage: BufferUsageFlags,
    ) -> Result<GpuBuffer> {
        let aligned_size = self.allocation_size(data.len() as u64)?;

        let mut transfer = StagingTransfer {
            staging: self.create_general_buffer(
                device,
                aligned_size,
                usage | BufferUsageFlags::TRANSFER_SRC,
                MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
            )?,
            destination: GpuBuffer::default(),
        };

        match self.run_transfer(device, &mut transfer, data, usage, aligned_size) {
            Ok(()) => {
                engine_debug!(
                    "prism3d::transfer",
                    "Uploaded {} bytes ({} allocated) as {:?}",
                    data.len(), aligned_size, usage
                );
                Ok(transfer.finish(device))
            }
            Err(e) => {
                transfer.abort(device);
                Err(e)
            }
        }
    }

    fn run_transfer(
        &self,
        device: &mut dyn GraphicsDevice,
        transfer: &mut StagingTransfer,
        data: &[u8],
        usage: BufferUsageFlags,
        aligned_size: u64,
    ) -> Result<()> {
        let mut padded = vec![0u8; aligned_size as usize];
        padded[..data.len()].copy_from_slice(data);
        device.write_memory(transfer.staging.memory(), 0, &padded)?;

        let mut destination_usage = usage | BufferUsageFlags::TRANSFER_DST;
        if self.readback {
            destination_usage |= BufferUsageFlags::TRANSFER_SRC;
        }
        transfer.destination = self.create_general_buffer(
            device,
            aligned_size,
            destination_usage,
            MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        Self::copy_buffer(device, transfer.staging.buffer(), transfer.destination.buffer(), aligned_size)
    }

    /// Record, submit and wait for a one-shot copy
    fn copy_buffer(
        device: &mut dyn GraphicsDevice,
        src: BufferHandle,
        dst: BufferHandle,
        size: u64,
    ) -> Result<()> {
        let command_buffer = device.begin_one_shot()?;
        if let Err(e) = device.cmd_copy_buffer(command_buffer, src, dst, size) {
            device.free_command_buffer(command_buffer);
            return Err(e);
        }
        device.submit_one_shot_and_wait(command_buffer)
    }

    /// Upload vertices into a device-local vertex buffer
    pub fn upload_vertices(&self, device: &mut dyn GraphicsDevice, vertices: &[Vertex]) -> Result<GpuBuffer> {
        self.upload_to_device(device, bytemuck::cast_slice(vertices), BufferUsageFlags::VERTEX)
    }

    /// Upload 32-bit indices into a device-local index buffer
    pub fn upload_indices(&self, device: &mut dyn GraphicsDevice, indices: &[u32]) -> Result<GpuBuffer> {
        self.upload_to_device(device, bytemuck::cast_slice(indices), BufferUsageFlags::INDEX)
    }

    /// Upload every object of the scene, in scene order
    ///
    /// Each object gets a vertex buffer, and an index buffer when it has
    /// indices. Buffers previously attached to an object are released. On
    /// failure, buffers already attached stay with their objects for the
    /// lifecycle manager to release. Returns the number of buffers created.
    pub fn upload_scene(&self, device: &mut dyn GraphicsDevice, scene: &mut Scene) -> Result<usize> {
        let mut uploaded = 0;
        for object in scene.objects_mut() {
            let vertex_buffer = self.upload_vertices(device, object.vertices())?;
            if let Some(mut previous) = object.attach_vertex_buffer(vertex_buffer) {
                previous.release(device);
            }
            uploaded += 1;

            if object.is_indexed() {
                let index_buffer = self.upload_indices(device, object.indices())?;
                if let Some(mut previous) = object.attach_index_buffer(index_buffer) {
                    previous.release(device);
                }
                uploaded += 1;
            }

            engine_debug!(
                "prism3d::transfer",
                "Object '{}': {} vertices, {} indices on device",
                object.name(), object.vertices().len(), object.indices().len()
            );
        }
        Ok(uploaded)
    }

    /// Copy the first `len` bytes of a device-local buffer back to the host
    ///
    /// Debug path: the buffer must have been uploaded by an engine built
    /// [`with_readback`](Self::with_readback).
    pub fn download_from_device(
        &self,
        device: &mut dyn GraphicsDevice,
        buffer: &GpuBuffer,
        len: usize,
    ) -> Result<Vec<u8>> {
        if !buffer.is_valid() {
            engine_error!("prism3d::transfer", "Readback from a released buffer");
            return Err(Error::InvalidResource("readback from a released buffer".to_string()));
        }
        if len as u64 > buffer.size() {
            engine_error!(
                "prism3d::transfer",
                "Readback of {} bytes exceeds buffer size {}",
                len, buffer.size()
            );
            return Err(Error::InvalidResource(format!(
                "readback of {} bytes exceeds buffer size {}",
                len,
                buffer.size()
            )));
        }

        let mut readback = self.create_general_buffer(
            device,
            buffer.size(),
            BufferUsageFlags::TRANSFER_DST,
            MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
        )?;

        let result = Self::copy_buffer(device, buffer.buffer(), readback.buffer(), buffer.size())
            .and_then(|()| device.read_memory(readback.memory(), 0, len));
        readback.release(device);
        result
    }
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;
