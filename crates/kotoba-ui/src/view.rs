use kotoba_types::{AnalysisResult, GrammarToken, UiEvent};

pub const TOKENS_PER_PAGE: usize = 6;

/// Display state for one result.
///
/// A fresh view is built for every new result, so the page and the
/// source-text toggle never carry over between scans.
#[derive(Debug, Clone)]
pub struct ResultView {
    result: AnalysisResult,
    /// 1-based
    current_page: usize,
    original_expanded: bool,
}

impl ResultView {
    pub fn new(result: AnalysisResult, original_expanded: bool) -> Self {
        Self {
            result,
            current_page: 1,
            original_expanded,
        }
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn total_pages(&self) -> usize {
        self.result.tokens.len().div_ceil(TOKENS_PER_PAGE)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Pagination controls only make sense with more than one page
    pub fn shows_pagination(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Index of the first token on the current page
    pub fn page_start(&self) -> usize {
        (self.current_page - 1) * TOKENS_PER_PAGE
    }

    pub fn page_tokens(&self) -> &[GrammarToken] {
        let start = self.page_start().min(self.result.tokens.len());
        let end = (start + TOKENS_PER_PAGE).min(self.result.tokens.len());
        &self.result.tokens[start..end]
    }

    pub fn original_expanded(&self) -> bool {
        self.original_expanded
    }

    pub fn toggle_original(&mut self) {
        self.original_expanded = !self.original_expanded;
    }

    /// Returns true when the view changed
    pub fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::NextPage => self.next_page(),
            UiEvent::PrevPage => self.prev_page(),
            UiEvent::ToggleOriginal => {
                self.toggle_original();
                true
            }
        }
    }
}
