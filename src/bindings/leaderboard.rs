//! Leaderboard PyClass

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::competition::{CategoryId, CompetitionId};
use crate::scoring::PlantRanking;
use crate::service::{LeaderboardRow, LeaderboardView};

/// Standings held in Rust memory.
///
/// Python keeps a handle and pulls pages on demand instead of receiving the whole ranking
/// as one large list.
#[pyclass]
pub struct Leaderboard {
    competition_id: CompetitionId,
    category: Option<CategoryId>,
    standings: Vec<PlantRanking>,
    provisional: bool,
    page_size: usize,
}

impl Leaderboard {
    pub fn new(
        competition_id: CompetitionId,
        category: Option<CategoryId>,
        standings: Vec<PlantRanking>,
        provisional: bool,
        page_size: usize,
    ) -> Self {
        Self {
            competition_id,
            category,
            standings,
            provisional,
            page_size: page_size.max(1),
        }
    }

    fn view(&self, page: usize, page_size: usize) -> LeaderboardView {
        LeaderboardView::paginate(
            self.competition_id.clone(),
            self.category.clone(),
            self.provisional,
            &self.standings,
            page,
            page_size,
        )
    }

    fn row_to_dict<'py>(py: Python<'py>, row: &LeaderboardRow) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("rank", row.rank)?;
        dict.set_item("entry_id", row.entry_id.as_str())?;
        dict.set_item("competitor_id", row.competitor_id.as_str())?;
        dict.set_item("category_id", row.category_id.as_str())?;
        dict.set_item("strain_name", &row.strain_name)?;
        dict.set_item("score", row.score)?;
        dict.set_item("score_bar", &row.score_bar)?;
        Ok(dict)
    }
}

#[pymethods]
impl Leaderboard {
    #[getter]
    fn competition_id(&self) -> &str {
        self.competition_id.as_str()
    }

    #[getter]
    fn category(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.as_str())
    }

    /// Whether entries may still move (results not final yet)
    #[getter]
    fn provisional(&self) -> bool {
        self.provisional
    }

    #[getter]
    fn total_entries(&self) -> usize {
        self.standings.len()
    }

    #[getter]
    fn total_pages(&self) -> usize {
        self.standings.len().div_ceil(self.page_size)
    }

    /// Rows of one page (1-indexed); empty past the last page
    #[pyo3(signature = (page, page_size=None))]
    fn get_page(&self, py: Python<'_>, page: usize, page_size: Option<usize>) -> PyResult<Py<PyAny>> {
        let view = self.view(page, page_size.unwrap_or(self.page_size));
        let list = PyList::empty(py);
        for row in &view.rows {
            list.append(Self::row_to_dict(py, row)?)?;
        }
        Ok(list.into_any().unbind())
    }

    /// Row at `index` (0-indexed) or None
    fn get_row(&self, py: Python<'_>, index: usize) -> PyResult<Py<PyAny>> {
        match self.standings.get(index) {
            Some(ranking) => Ok(Self::row_to_dict(py, &LeaderboardRow::from(ranking))?
                .into_any()
                .unbind()),
            None => Ok(py.None()),
        }
    }

    fn __len__(&self) -> usize {
        self.standings.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Leaderboard(competition={}, entries={}, provisional={})",
            self.competition_id,
            self.standings.len(),
            self.provisional
        )
    }
}
