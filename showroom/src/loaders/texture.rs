use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ddsfile::{D3DFormat, Dds, DxgiFormat};
use hashbrown::HashMap;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};

use super::LoadError;
use crate::graphics::{Texture, TextureFormat};

const DDS_MAGIC: &[u8] = b"DDS ";

/// Identifies a background texture load. The owner separates the requesters
/// sharing one loader, the generation lets a requester drop results that
/// belong to an outdated override directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureRequest {
    pub owner: u64,
    pub generation: u64,
    pub name: String,
}

enum LoadStatus {
    Loading,
    Completed(Result<Arc<Texture>, LoadError>),
}

pub struct TextureLoader {
    thread_pool: ThreadPool,
    pending_loads: Arc<Mutex<HashMap<TextureRequest, LoadStatus>>>,
    next_owner: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TextureLoader {
    pub fn new(thread_count: usize) -> Result<Self, ThreadPoolBuildError> {
        let thread_pool = ThreadPoolBuilder::new()
            .thread_name(|number| format!("texture loader thread {number}"))
            .num_threads(thread_count.max(1))
            .build()?;

        Ok(Self {
            thread_pool,
            pending_loads: Arc::new(Mutex::new(HashMap::new())),
            next_owner: AtomicU64::new(0),
        })
    }

    /// Hands out an id that is unique for this loader. Every requester tags
    /// its requests with its own id.
    pub fn register_owner(&self) -> u64 {
        self.next_owner.fetch_add(1, Ordering::Relaxed)
    }

    pub fn load_file(&self, path: &Path) -> Result<Arc<Texture>, LoadError> {
        load_file(path)
    }

    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<Arc<Texture>, LoadError> {
        decode_texture(name, bytes).map(Arc::new)
    }

    /// Starts loading the file on the thread pool unless the same request is
    /// already pending.
    pub fn request_load(&self, request: TextureRequest, path: PathBuf) {
        {
            let mut pending_loads = lock(&self.pending_loads);

            if pending_loads.contains_key(&request) {
                return;
            }

            pending_loads.insert(request.clone(), LoadStatus::Loading);
        }

        let pending_loads = Arc::clone(&self.pending_loads);

        self.thread_pool.spawn(move || {
            let result = load_file(&path);
            let mut pending_loads = lock(&pending_loads);

            if !pending_loads.contains_key(&request) {
                return;
            }

            pending_loads.insert(request, LoadStatus::Completed(result));
        });
    }

    /// Forgets every request of `owner` with the given generation. Their
    /// results are discarded when they finish.
    pub fn cancel_generation(&self, owner: u64, generation: u64) {
        lock(&self.pending_loads).retain(|request, _| request.owner != owner || request.generation != generation);
    }

    /// Removes the finished loads of `owner`. Loads of other owners stay
    /// until they are taken by their owner.
    pub fn take_completed(&self, owner: u64) -> Vec<(TextureRequest, Result<Arc<Texture>, LoadError>)> {
        let mut pending_loads = lock(&self.pending_loads);

        let completed: Vec<TextureRequest> = pending_loads
            .iter()
            .filter(|(request, status)| request.owner == owner && matches!(status, LoadStatus::Completed(_)))
            .map(|(request, _)| request.clone())
            .collect();

        completed
            .into_iter()
            .filter_map(|request| match pending_loads.remove(&request) {
                Some(LoadStatus::Completed(result)) => Some((request, result)),
                _ => None,
            })
            .collect()
    }
}

fn load_file(path: &Path) -> Result<Arc<Texture>, LoadError> {
    #[cfg(feature = "debug")]
    let timer = Timer::new_dynamic(format!("load texture {}", path.display().magenta()));

    let bytes = std::fs::read(path).map_err(|error| LoadError::file(path, error))?;
    let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let texture = decode_texture(&name, &bytes).map(Arc::new);

    #[cfg(feature = "debug")]
    match &texture {
        Ok(_) => timer.stop(),
        Err(error) => {
            print_debug!("[{}] {}", "error".red(), error);
            drop(timer);
        }
    }

    texture
}

/// Decodes a DDS container or any image format supported by `image`.
pub fn decode_texture(name: &str, bytes: &[u8]) -> Result<Texture, LoadError> {
    if bytes.starts_with(DDS_MAGIC) {
        return decode_dds(name, bytes);
    }

    let image = image::load_from_memory(bytes).map_err(|error| LoadError::decode(name, error))?.to_rgba8();
    let transparent = image.pixels().any(|pixel| pixel.0[3] < 255);
    let (width, height) = image.dimensions();

    Ok(Texture::new(
        name.to_owned(),
        width,
        height,
        1,
        TextureFormat::Rgba8,
        transparent,
        image.into_raw(),
    ))
}

fn decode_dds(name: &str, bytes: &[u8]) -> Result<Texture, LoadError> {
    let mut reader = bytes;
    let dds = Dds::read(&mut reader).map_err(|error| LoadError::decode(name, error))?;

    let (format, swizzle) = match (dds.get_dxgi_format(), dds.get_d3d_format()) {
        (Some(DxgiFormat::BC1_UNorm | DxgiFormat::BC1_UNorm_sRGB), _) | (_, Some(D3DFormat::DXT1)) => (TextureFormat::Bc1, false),
        (Some(DxgiFormat::BC2_UNorm | DxgiFormat::BC2_UNorm_sRGB), _) | (_, Some(D3DFormat::DXT2 | D3DFormat::DXT3)) => {
            (TextureFormat::Bc2, false)
        }
        (Some(DxgiFormat::BC3_UNorm | DxgiFormat::BC3_UNorm_sRGB), _) | (_, Some(D3DFormat::DXT4 | D3DFormat::DXT5)) => {
            (TextureFormat::Bc3, false)
        }
        (Some(DxgiFormat::BC4_UNorm), _) => (TextureFormat::Bc4, false),
        (Some(DxgiFormat::BC5_UNorm), _) => (TextureFormat::Bc5, false),
        (Some(DxgiFormat::BC7_UNorm | DxgiFormat::BC7_UNorm_sRGB), _) => (TextureFormat::Bc7, false),
        (Some(DxgiFormat::R8G8B8A8_UNorm | DxgiFormat::R8G8B8A8_UNorm_sRGB), _) | (_, Some(D3DFormat::A8B8G8R8)) => {
            (TextureFormat::Rgba8, false)
        }
        (_, Some(D3DFormat::A8R8G8B8)) => (TextureFormat::Rgba8, true),
        (dxgi, d3d) => return Err(LoadError::UnsupportedFormat(format!("{name}: {dxgi:?} {d3d:?}"))),
    };

    let mut data = dds.data.clone();

    if swizzle {
        data.chunks_exact_mut(4).for_each(|pixel| pixel.swap(0, 2));
    }

    // Block compressed data may hide alpha in any block, so only plain
    // pixels are checked.
    let transparent = match format {
        TextureFormat::Rgba8 => data.chunks_exact(4).any(|pixel| pixel[3] < 255),
        TextureFormat::Bc2 | TextureFormat::Bc3 | TextureFormat::Bc7 => true,
        _ => false,
    };

    Ok(Texture::new(
        name.to_owned(),
        dds.get_width(),
        dds.get_height(),
        dds.get_num_mipmap_levels().max(1),
        format,
        transparent,
        data,
    ))
}
