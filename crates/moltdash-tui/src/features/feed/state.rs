/// Scroll mode for the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollMode {
    /// Auto-scroll to the newest card.
    FollowLatest,
    /// User scrolled manually; offset is line index from top.
    Anchored { offset: usize },
}

/// Scroll state for the feed pane.
///
/// New cards never move an anchored viewport; following resumes only when
/// the user returns to the bottom.
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub mode: ScrollMode,
    /// Total feed line count at the current width.
    pub cached_line_count: usize,
    /// Feed viewport height in lines.
    pub viewport_height: usize,
    /// Feed content width in columns.
    pub viewport_width: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            mode: ScrollMode::FollowLatest,
            cached_line_count: 0,
            viewport_height: 0,
            viewport_width: 0,
        }
    }
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        matches!(self.mode, ScrollMode::FollowLatest)
    }

    fn max_offset(&self) -> usize {
        self.cached_line_count.saturating_sub(self.viewport_height)
    }

    /// Offset of the first visible line.
    pub fn offset(&self) -> usize {
        match &self.mode {
            ScrollMode::FollowLatest => self.max_offset(),
            ScrollMode::Anchored { offset } => (*offset).min(self.max_offset()),
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let new_offset = self.offset().saturating_sub(lines);
        if new_offset < self.max_offset() {
            self.mode = ScrollMode::Anchored { offset: new_offset };
        }
    }

    /// Scrolls down; reaching the bottom resumes following.
    pub fn scroll_down(&mut self, lines: usize) {
        if self.is_following() {
            return;
        }

        let new_offset = (self.offset() + lines).min(self.max_offset());
        if new_offset >= self.max_offset() {
            self.mode = ScrollMode::FollowLatest;
        } else {
            self.mode = ScrollMode::Anchored { offset: new_offset };
        }
    }

    pub fn scroll_to_top(&mut self) {
        if self.max_offset() > 0 {
            self.mode = ScrollMode::Anchored { offset: 0 };
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.max(1));
    }

    /// Lines below the viewport while anchored.
    pub fn lines_below(&self) -> usize {
        self.max_offset().saturating_sub(self.offset())
    }
}
