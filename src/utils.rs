/// File name utility functions / 文件名工具函数

use once_cell::sync::Lazy;
use regex::Regex;

/// `publication.chapter.ext` convention / 两点文件名约定
static TWO_DOT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.+)\.(.+)\.").unwrap());

/// Strip any client-side directory from an uploaded file name / 去掉上传文件名中的路径
/// 1. Replace backslashes with forward slashes / 将反斜杠替换为正斜杠
/// 2. Keep the last non-empty segment / 保留最后一段
pub fn file_base_name(name: &str) -> String {
    name.replace('\\', "/")
        .split('/')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .last()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Split `publication.chapter.ext` into (publication, chapter) / 拆分出版物与章节
pub fn split_file_name(file_name: &str) -> Option<(String, String)> {
    TWO_DOT_NAME
        .captures(file_name)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// Get file extension (lowercase) / 获取文件扩展名
pub fn get_ext(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
