/// What page decorations and deferred content can see about the layout in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocContext {
    pub page_number: usize,
    pub template_name: String,
    /// Page count produced by the previous pass of a multi-pass build.
    pub previous_page_count: Option<usize>,
}

impl DocContext {
    pub fn new(page_number: usize, template_name: impl Into<String>) -> Self {
        Self {
            page_number,
            template_name: template_name.into(),
            previous_page_count: None,
        }
    }

    pub fn with_previous_page_count(mut self, count: Option<usize>) -> Self {
        self.previous_page_count = count;
        self
    }
}
