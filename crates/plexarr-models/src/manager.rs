use serde::{Deserialize, Serialize};

/// One physical file backing a movie in Radarr
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileVariant {
    pub id: u32,
    /// Quality definition id; resolved to a weight by the manager
    pub quality_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_name: Option<String>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

impl FileVariant {
    pub fn display_name(&self) -> String {
        let path = self
            .relative_path
            .clone()
            .unwrap_or_else(|| format!("file #{}", self.id));
        format!("{} ({})", path, self.quality_name.as_deref().unwrap_or("Unknown"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityProfile {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootFolder {
    pub id: Option<u32>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_space: Option<u64>,
}
