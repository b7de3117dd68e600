//! crates/cinema_core/src/view.rs
//!
//! Typed markup for the storefront. Templates build a [`Node`] tree from
//! [`Film`] values and [`Node::render`] serializes it, escaping every text
//! node and attribute value on the way out.

use crate::domain::Film;

//=========================================================================================
// Node Tree
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Sibling nodes without a wrapper element.
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

/// Starts an element builder.
pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(value: impl Into<String>) -> Node {
    Node::Text(value.into())
}

const VOID_TAGS: &[&str] = &["img", "br", "hr", "input"];

impl Element {
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, value: &'static str) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(text(value))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Node::Text(value) => escape_into(value, out),
            Node::Fragment(nodes) => nodes.iter().for_each(|n| n.write_to(out)),
            Node::Element(element) => {
                out.push('<');
                out.push_str(element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&element.tag) {
                    return;
                }
                for child in &element.children {
                    child.write_to(out);
                }
                out.push_str("</");
                out.push_str(element.tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

//=========================================================================================
// Storefront Copy
//=========================================================================================

pub const NOT_FOUND_TEXT: &str = "Фильмы не найдены";
pub const LOADING_TEXT: &str = "Загрузка...";
pub const RETRY_TEXT: &str = "Попробовать снова";
pub const ADD_FAVORITE_TEXT: &str = "В избранное";
pub const WATCH_TEXT: &str = "Смотреть";
pub const DESCRIPTION_PLACEHOLDER: &str = "Описание отсутствует";
pub const GENRE_PLACEHOLDER: &str = "Не указан";
pub const GRID_POSTER_FALLBACK: &str = "https://picsum.photos/300/450";
pub const WIDE_POSTER_FALLBACK: &str = "https://picsum.photos/600/300";

/// Trigger names the page shell forwards back as events.
pub const ACTION_PLAY: &str = "play-film";
pub const ACTION_FAVORITE: &str = "add-favorite";
pub const ACTION_RETRY: &str = "retry";

//=========================================================================================
// Templates
//=========================================================================================

/// The main grid: one card per film, or the "not found" placeholder.
pub fn film_grid(films: &[Film]) -> Node {
    if films.is_empty() {
        return not_found();
    }
    Node::Fragment(films.iter().map(film_card).collect())
}

/// The recommendation panel: wide cards with description, or the placeholder.
pub fn recommendations(films: &[Film]) -> Node {
    if films.is_empty() {
        return not_found();
    }
    Node::Fragment(films.iter().map(recommendation_card).collect())
}

pub fn not_found() -> Node {
    el("div")
        .class("col-span-full text-center py-10")
        .attr("data-role", "not-found")
        .child(el("i").class("fas fa-film text-3xl text-gray-600 mb-4"))
        .child(el("p").class("text-gray-400").text(NOT_FOUND_TEXT))
        .into()
}

pub fn loading() -> Node {
    el("div")
        .class("col-span-full text-center py-10")
        .attr("data-role", "loading")
        .child(el("i").class("fas fa-spinner fa-spin text-2xl text-red-600"))
        .child(el("p").class("mt-2 text-gray-400").text(LOADING_TEXT))
        .into()
}

/// Inline failure notice with a control that reloads the full catalog.
pub fn inline_error(message: &str) -> Node {
    el("div")
        .class("col-span-full text-center py-10")
        .attr("data-role", "error")
        .child(el("i").class("fas fa-exclamation-triangle text-2xl text-red-600"))
        .child(el("p").class("mt-2 text-gray-400").text(message))
        .child(
            el("button")
                .class("mt-4 bg-red-600 hover:bg-red-700 px-4 py-2 rounded")
                .attr("data-action", ACTION_RETRY)
                .text(RETRY_TEXT),
        )
        .into()
}

fn metadata_line(film: &Film) -> String {
    let genre = film.genre.as_deref().unwrap_or(GENRE_PLACEHOLDER);
    match film.release_year {
        Some(year) => format!("{} • {}", year, genre),
        None => genre.to_string(),
    }
}

fn film_card(film: &Film) -> Node {
    let poster = film.poster_url.as_deref().unwrap_or(GRID_POSTER_FALLBACK);
    let id = film.id.to_string();

    el("div")
        .class("group cursor-pointer")
        .attr("data-role", "film-card")
        .attr("data-film-id", id.clone())
        .child(
            el("div")
                .class("relative overflow-hidden rounded-lg mb-3")
                .child(
                    el("img")
                        .attr("src", poster)
                        .attr("alt", film.title.clone())
                        .class("w-full aspect-[2/3] object-cover group-hover:scale-105 transition-transform duration-300"),
                )
                .child(
                    el("div")
                        .class("absolute inset-0 bg-black bg-opacity-0 group-hover:bg-opacity-50 transition-all duration-300 flex items-center justify-center")
                        .child(
                            el("button")
                                .attr("data-action", ACTION_PLAY)
                                .attr("data-film-id", id.clone())
                                .class("bg-red-600 hover:bg-red-700 text-white p-3 rounded-full opacity-0 group-hover:opacity-100 transform translate-y-4 group-hover:translate-y-0 transition-all duration-300")
                                .child(el("i").class("fas fa-play")),
                        ),
                )
                .child(
                    el("div")
                        .class("absolute top-2 right-2 bg-yellow-500 text-black text-xs font-bold px-2 py-1 rounded")
                        .attr("data-role", "rating")
                        .text(film.rating_label()),
                ),
        )
        .child(
            el("h3")
                .class("font-semibold text-sm mb-1 line-clamp-1")
                .text(film.title.clone()),
        )
        .child(el("p").class("text-gray-400 text-xs").text(metadata_line(film)))
        .child(
            el("button")
                .attr("data-action", ACTION_FAVORITE)
                .attr("data-film-id", id)
                .class("mt-2 text-red-400 hover:text-red-300 text-xs")
                .child(el("i").class("fas fa-heart mr-1"))
                .text(ADD_FAVORITE_TEXT),
        )
        .into()
}

fn recommendation_card(film: &Film) -> Node {
    let poster = film.poster_url.as_deref().unwrap_or(WIDE_POSTER_FALLBACK);
    let description = film.description.as_deref().unwrap_or(DESCRIPTION_PLACEHOLDER);
    let genre = film.genre.as_deref().unwrap_or(GENRE_PLACEHOLDER);

    el("div")
        .class("bg-gray-800 rounded-xl overflow-hidden hover:bg-gray-700 transition-colors")
        .attr("data-role", "recommendation-card")
        .attr("data-film-id", film.id.to_string())
        .child(
            el("img")
                .attr("src", poster)
                .attr("alt", film.title.clone())
                .class("w-full h-48 object-cover"),
        )
        .child(
            el("div")
                .class("p-4")
                .child(el("h3").class("font-bold text-lg mb-2").text(film.title.clone()))
                .child(
                    el("p")
                        .class("text-gray-300 text-sm mb-4 line-clamp-3")
                        .text(description),
                )
                .child(
                    el("div")
                        .class("flex justify-between items-center")
                        .child(
                            el("span")
                                .class("bg-red-600 text-xs px-3 py-1 rounded-full")
                                .text(genre),
                        )
                        .child(
                            el("span")
                                .class("text-yellow-400 text-sm")
                                .attr("data-role", "rating")
                                .text(format!("★ {}", film.rating_label())),
                        ),
                )
                .child(
                    el("button")
                        .attr("data-action", ACTION_PLAY)
                        .attr("data-film-id", film.id.to_string())
                        .class("w-full mt-4 bg-red-600 hover:bg-red-700 px-4 py-2 rounded transition-colors")
                        .text(WATCH_TEXT),
                ),
        )
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Node {
        /// Counts elements in the tree carrying `data-role="<role>"`.
        fn count_role(&self, role: &str) -> usize {
            match self {
                Node::Text(_) => 0,
                Node::Fragment(nodes) => nodes.iter().map(|n| n.count_role(role)).sum(),
                Node::Element(element) => {
                    let own = element
                        .attrs
                        .iter()
                        .any(|(name, value)| *name == "data-role" && value == role);
                    usize::from(own) + element.children.iter().map(|n| n.count_role(role)).sum::<usize>()
                }
            }
        }
    }

    fn film(id: i64, title: &str, rating: Option<f64>) -> Film {
        Film {
            id,
            title: title.to_string(),
            genre: Some("Драма".to_string()),
            release_year: Some(2022),
            rating,
            poster_url: None,
            video_url: None,
            description: None,
        }
    }

    #[test]
    fn empty_grid_is_only_the_placeholder() {
        let node = film_grid(&[]);
        assert_eq!(node.count_role("not-found"), 1);
        assert_eq!(node.count_role("film-card"), 0);
        assert!(node.render().contains(NOT_FOUND_TEXT));

        let panel = recommendations(&[]);
        assert_eq!(panel.count_role("not-found"), 1);
        assert_eq!(panel.count_role("recommendation-card"), 0);
    }

    #[test]
    fn grid_renders_cards_in_input_order() {
        let films = vec![film(2, "Второй", Some(9.0)), film(1, "Первый", Some(7.5))];
        let html = film_grid(&films).render();

        assert_eq!(film_grid(&films).count_role("film-card"), 2);
        let second = html.find("Второй").unwrap();
        let first = html.find("Первый").unwrap();
        assert!(second < first);
        assert!(html.contains("data-action=\"play-film\" data-film-id=\"2\""));
        assert!(html.contains("data-action=\"add-favorite\" data-film-id=\"1\""));
        assert!(html.contains("2022 • Драма"));
    }

    #[test]
    fn rating_badge_is_one_decimal_or_placeholder() {
        let html = film_grid(&[film(1, "A", Some(8.25)), film(2, "B", None)]).render();
        assert!(html.contains(">8.3<"));
        assert!(html.contains(">N/A<"));
    }

    #[test]
    fn recommendation_card_has_description_placeholder_and_watch_trigger() {
        let html = recommendations(&[film(5, "Сталкер", Some(8.1))]).render();
        assert!(html.contains(DESCRIPTION_PLACEHOLDER));
        assert!(html.contains(WATCH_TEXT));
        assert!(html.contains("★ 8.1"));
        assert!(html.contains(WIDE_POSTER_FALLBACK));
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let html = film_grid(&[film(1, "<b>\"Tom & Jerry\"</b>", None)]).render();
        assert!(html.contains("&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let html = Node::from(el("img").attr("src", "x")).render();
        assert_eq!(html, "<img src=\"x\">");
    }

    #[test]
    fn inline_error_offers_retry() {
        let html = inline_error("Ошибка загрузки").render();
        assert!(html.contains("data-action=\"retry\""));
        assert!(html.contains(RETRY_TEXT));
    }
}
