use serde::{Deserialize, Serialize};

/// The raw `?page=` parameter. It is kept as a string so that
/// garbage can fall back to the first page instead of being rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageInput {
	pub page: Option<String>,
}

/// Splits `count` items into pages of `per_page`.
///
/// There is always at least one page, even when there are no items.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	count: i64,
	per_page: i64,
}

impl Paginator {
	pub fn new(count: i64, per_page: i64) -> Self {
		Self {
			count: count.max(0),
			per_page: per_page.max(1),
		}
	}

	pub fn num_pages(&self) -> i64 {
		((self.count + self.per_page - 1) / self.per_page).max(1)
	}

	/// Resolves a requested page number. Anything that is not an integer
	/// gives the first page, and integers out of range give the last page.
	pub fn number(&self, requested: Option<&str>) -> i64 {
		let Some(requested) = requested else {
			return 1;
		};

		match requested.trim().parse::<i64>() {
			Ok(number) if (1..=self.num_pages()).contains(&number) => number,
			Ok(_) => self.num_pages(),
			Err(_) => 1,
		}
	}

	pub fn offset(&self, number: i64) -> i64 {
		(number - 1) * self.per_page
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}

	/// Wraps the items of page `number`.
	pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
		let num_pages = self.num_pages();

		Page {
			items,
			number,
			num_pages,
			count: self.count,
			has_previous: number > 1,
			has_next: number < num_pages,
			previous_page_number: (number > 1).then(|| number - 1),
			next_page_number: (number < num_pages).then(|| number + 1),
		}
	}
}

/// A single page of results, as handed to templates.
#[derive(Debug, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
	pub has_previous: bool,
	pub has_next: bool,
	pub previous_page_number: Option<i64>,
	pub next_page_number: Option<i64>,
}
