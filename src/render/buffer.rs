use wgpu::util::DeviceExt;

// A custom buffer container for dynamic resizing.
pub struct Buffer {
    pub raw: wgpu::Buffer,
    label: &'static str,
    size: u64,
    usage: wgpu::BufferUsages,
}

impl Buffer {
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        Self {
            raw: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            }),
            label,
            size,
            usage,
        }
    }

    pub fn new_init(
        device: &wgpu::Device,
        label: &'static str,
        data: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Self {
        Self {
            raw: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage,
            }),
            label,
            size: data.len() as u64,
            usage,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn resize(&mut self, device: &wgpu::Device, new_size: u64) {
        if new_size > self.size {
            self.raw = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: new_size,
                usage: self.usage,
                mapped_at_creation: false,
            });
            self.size = new_size;
        }
    }

    /// Writes `data` at the start of the buffer, growing it first if needed.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.resize(device, grown_size(self.size, data.len() as u64));
        queue.write_buffer(&self.raw, 0, data);
    }
}

/// Next power of two that fits `required`, never shrinking.
fn grown_size(current: u64, required: u64) -> u64 {
    if required <= current {
        current
    } else {
        required.next_power_of_two()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(256, 64, 256)]
    #[case(256, 256, 256)]
    #[case(256, 257, 512)]
    #[case(0, 192, 256)]
    fn grows_to_power_of_two(#[case] current: u64, #[case] required: u64, #[case] expected: u64) {
        assert_eq!(grown_size(current, required), expected);
    }
}
