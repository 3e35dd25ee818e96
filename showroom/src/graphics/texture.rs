/// Pixel layout of a decoded texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8,
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Bc7,
}

impl TextureFormat {
    pub fn is_block_compressed(self) -> bool {
        !matches!(self, TextureFormat::Rgba8)
    }
}

/// CPU side texture data, uploaded by the GPU layer when first drawn.
#[derive(Debug)]
pub struct Texture {
    name: String,
    width: u32,
    height: u32,
    mip_level_count: u32,
    format: TextureFormat,
    transparent: bool,
    data: Vec<u8>,
}

impl Texture {
    pub fn new(name: String, width: u32, height: u32, mip_level_count: u32, format: TextureFormat, transparent: bool, data: Vec<u8>) -> Self {
        Self {
            name,
            width,
            height,
            mip_level_count,
            format,
            transparent,
            data,
        }
    }

    /// Single pixel texture.
    pub fn solid(name: &str, rgba: [u8; 4]) -> Self {
        Self::new(name.to_owned(), 1, 1, 1, TextureFormat::Rgba8, rgba[3] < 255, rgba.to_vec())
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
