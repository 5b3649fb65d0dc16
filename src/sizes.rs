/// Waist sizes offered for trousers and shorts
pub const WAIST_SIZES: [&str; 8] = ["28", "30", "32", "34", "36", "38", "40", "42"];

/// Letter sizes offered for everything else
pub const LETTER_SIZES: [&str; 6] = ["XCH", "CH", "M", "G", "XG", "XXG"];

const WAIST_SIZED_KEYWORDS: [&str; 3] = ["pantalón", "pantalon", "short"];

/// Size choices for a category, in display order.
pub fn size_options(category: &str) -> &'static [&'static str] {
    let category = category.to_lowercase();
    if WAIST_SIZED_KEYWORDS.iter().any(|word| category.contains(word)) {
        &WAIST_SIZES
    } else {
        &LETTER_SIZES
    }
}
