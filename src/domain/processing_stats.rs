use super::TemplateId;

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateUsage {
    pub template_id: TemplateId,
    pub title: String,
    pub icon_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessingStats {
    pub total_processed: u64,
    pub text_content: u64,
    pub audio_content: u64,
    pub avg_processing_time_ms: f64,
    pub total_processing_time_ms: u64,
    pub top_formats: Vec<TemplateUsage>,
}
