use itertools::Itertools;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Avi,
    Mov,
    Mkv,
    Webm,
}

impl VideoFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_lowercase().as_str() {
            "mp4" => Some(VideoFormat::Mp4),
            "avi" => Some(VideoFormat::Avi),
            "mov" => Some(VideoFormat::Mov),
            "mkv" => Some(VideoFormat::Mkv),
            "webm" => Some(VideoFormat::Webm),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Avi => "video/x-msvideo",
            VideoFormat::Mov => "video/quicktime",
            VideoFormat::Mkv => "video/x-matroska",
            VideoFormat::Webm => "video/webm",
        }
    }
}

pub struct VideoUpload {
    pub file_name: String,
    pub format: VideoFormat,
    pub bytes: Vec<u8>,
}

/// Checks the client-supplied file name. The error is the message shown to
/// the client.
pub fn validate_video_file_name(file_name: Option<&str>) -> Result<VideoFormat, String> {
    let file_name = match file_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err("No video selected".to_string()),
    };

    VideoFormat::from_file_name(file_name).ok_or_else(|| {
        format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.iter().join(", ")
        )
    })
}
