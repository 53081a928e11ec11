//! Image/background pass.
//!
//! `![name token…](url)`: the first word of the alt text is the display name,
//! the rest is an annotation read with image-specific meaning.
//!
//! | token                          | field                         |
//! |--------------------------------|-------------------------------|
//! | `blur`, `blur:4px`, `sepia` …  | filter (default value if bare)|
//! | `cover` `contain` `fill`       | fit                           |
//! | `top` `left` `right` `bottom` `center` | position keyword      |
//! | `top:1em` …                    | side offset                   |
//! | `x:` `y:`                      | explicit position axis        |
//! | `w:` `h:`                      | width / height                |
//! | `repeat` `no-repeat` `repeat-x` `repeat-y` `space` `round` | repeat |
//! | `rx:` `ry:`                    | explicit repeat axis          |
//! | `size:`                        | grid size of a background layer |
//! | `bg` `absolute` `vertical`     | flags                         |
//!
//! Explicit axis tokens beat the position keyword; explicit dimensions beat the
//! fit keyword for `background-size`. Anything else passes through as element
//! attributes.

use crate::tree::{Element, Image, Node};
use slidemd_core::{AttrValue, AttributeBag, Token, tokenize};

const DEFAULT_FILTERS: &[(&str, &str)] = &[
    ("blur", "10px"),
    ("brightness", "1.5"),
    ("contrast", "2"),
    ("grayscale", "1"),
    ("hue-rotate", "180deg"),
    ("invert", "1"),
    ("opacity", "0.5"),
    ("saturate", "2"),
    ("sepia", "1"),
    ("drop-shadow", "2px 2px 5px rgba(0, 0, 0, 0.5)"),
];
const FIT_KEYS: &[&str] = &["cover", "contain", "fill"];
const POSITION_KEYS: &[&str] = &["top", "left", "right", "bottom", "center"];
const OFFSET_KEYS: &[&str] = &["top", "left", "right", "bottom"];
const REPEAT_KEYS: &[&str] = &["repeat", "no-repeat", "repeat-x", "repeat-y", "space", "round"];

/// Parsed image annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageStyle {
    /// `name(value)` entries in source order.
    pub filters: Vec<String>,
    /// Fit keyword.
    pub fit: Option<String>,
    /// Position keyword.
    pub position: Option<String>,
    /// Explicit horizontal position.
    pub x: Option<String>,
    /// Explicit vertical position.
    pub y: Option<String>,
    /// Width.
    pub width: Option<String>,
    /// Height.
    pub height: Option<String>,
    /// `(side, value)` offsets in top/left/right/bottom order.
    pub offsets: Vec<(&'static str, String)>,
    /// Repeat keyword.
    pub repeat: Option<String>,
    /// Explicit horizontal repeat.
    pub repeat_x: Option<String>,
    /// Explicit vertical repeat.
    pub repeat_y: Option<String>,
    /// Grid size when used as a background layer.
    pub size: Option<String>,
    /// Background layer flag.
    pub background: bool,
    /// Absolute positioning flag.
    pub absolute: bool,
    /// Vertical background stacking flag.
    pub vertical: bool,
    /// Pass-through attributes, classes and ids.
    pub extra: AttributeBag,
}

impl ImageStyle {
    /// Reads the annotation part of an alt text.
    pub fn parse(annotation: &str) -> Self {
        let mut style = ImageStyle::default();
        for token in tokenize(annotation) {
            match token {
                Token::Class(name) => style.extra.classes.push(name.to_string()),
                Token::Id(name) => style.extra.ids.push(name.to_string()),
                Token::Pair { key, value } => style.apply_pair(key, value),
            }
        }
        style.offsets.sort_by_key(|(side, _)| {
            OFFSET_KEYS.iter().position(|key| key == side).unwrap_or(usize::MAX)
        });
        style
    }

    fn apply_pair(&mut self, key: &str, value: Option<&str>) {
        if let Some((name, default)) = DEFAULT_FILTERS.iter().find(|(name, _)| *name == key) {
            self.filters.push(format!("{name}({})", value.unwrap_or(*default)));
            return;
        }

        match value {
            None => match key {
                _ if FIT_KEYS.contains(&key) => self.fit = Some(key.to_string()),
                _ if POSITION_KEYS.contains(&key) => self.position = Some(key.to_string()),
                _ if REPEAT_KEYS.contains(&key) => self.repeat = Some(key.to_string()),
                "bg" | "background" => self.background = true,
                "absolute" => self.absolute = true,
                "vertical" => self.vertical = true,
                _ => self.extra.attrs.insert(key, AttrValue::Bool(true)),
            },
            Some(value) => {
                let value = value.to_string();
                match key {
                    "x" => self.x = Some(value),
                    "y" => self.y = Some(value),
                    "w" => self.width = Some(value),
                    "h" => self.height = Some(value),
                    "rx" => self.repeat_x = Some(value),
                    "ry" => self.repeat_y = Some(value),
                    "size" => self.size = Some(value),
                    _ => match OFFSET_KEYS.iter().find(|side| **side == key) {
                        Some(side) => self.offsets.push((*side, value)),
                        None => self.extra.attrs.insert(key, AttrValue::Text(value)),
                    },
                }
            }
        }
    }

    fn has_axis(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    fn axis(&self) -> String {
        format!(
            "{} {}",
            self.x.as_deref().unwrap_or("50%"),
            self.y.as_deref().unwrap_or("50%")
        )
    }

    /// True when the image is taken out of flow.
    pub fn is_absolute(&self) -> bool {
        self.absolute
            || self.extra.classes.iter().any(|class| class == "absolute")
    }

    /// Inline `style` for an `<img>`; `None` when nothing applies.
    pub fn inline_style(&self) -> Option<String> {
        let mut styles = Vec::new();
        if !self.filters.is_empty() {
            styles.push(format!("filter: {}", self.filters.join(" ")));
        }
        if let Some(fit) = &self.fit {
            styles.push(format!("object-fit: {fit}"));
        }
        if self.has_axis() {
            styles.push(format!("object-position: {}", self.axis()));
        } else if let Some(position) = &self.position {
            styles.push(format!("object-position: {position}"));
        }
        if let Some(width) = &self.width {
            styles.push(format!("width: {width}"));
        }
        if let Some(height) = &self.height {
            styles.push(format!("height: {height}"));
        }
        for (side, value) in &self.offsets {
            styles.push(format!("{side}: {value}"));
        }
        if self.absolute {
            styles.push("position: absolute".to_string());
        }
        (!styles.is_empty()).then(|| styles.join("; "))
    }

    /// Background layer style for `url`.
    pub fn background_style(&self, url: &str) -> String {
        let mut styles = vec![format!("background-image:url({url})")];
        if !self.filters.is_empty() {
            styles.push(format!("filter:{}", self.filters.join(" ")));
        }

        let position = if self.has_axis() {
            self.axis()
        } else {
            self.position.clone().unwrap_or_else(|| "center".to_string())
        };
        styles.push(format!("background-position:{position}"));

        if self.width.is_some() || self.height.is_some() {
            styles.push(format!(
                "background-size:{} {}",
                self.width.as_deref().unwrap_or("auto"),
                self.height.as_deref().unwrap_or("auto")
            ));
        } else if let Some(fit) = &self.fit {
            styles.push(format!("background-size:{fit}"));
        }

        let repeat = if self.repeat_x.is_some() || self.repeat_y.is_some() {
            format!(
                "{} {}",
                self.repeat_x.as_deref().unwrap_or("no-repeat"),
                self.repeat_y.as_deref().unwrap_or("no-repeat")
            )
        } else {
            self.repeat.clone().unwrap_or_else(|| "no-repeat".to_string())
        };
        styles.push(format!("background-repeat:{repeat}"));

        styles.join("; ")
    }
}

/// Splits alt text into display name and annotation.
pub fn split_alt(alt: &str) -> (&str, &str) {
    let alt = alt.trim();
    alt.split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim_start()))
        .unwrap_or((alt, ""))
}

/// Options of the image pass.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    /// Add `loading="lazy"` to inline images.
    pub lazy: bool,
    /// Stack background layers vertically even without a `vertical` token.
    pub vertical: bool,
}

/// One background layer pulled out of the flow.
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    node: Node,
    size: String,
    vertical: bool,
}

/// Runs the pass over one partition and appends its background container.
pub fn apply_images(children: &mut Vec<Node>, options: ImageOptions) {
    let mut layers = Vec::new();
    process_children(children, options, &mut layers);
    prune_empty_paragraphs(children);

    if layers.is_empty() {
        return;
    }
    let vertical = options.vertical || layers.iter().any(|layer| layer.vertical);
    let sizes: Vec<&str> = layers.iter().map(|layer| layer.size.as_str()).collect();
    let property = if vertical { "--bg-rows" } else { "--bg-columns" };
    let container = Element::new("div")
        .with_class("advanced-bg")
        .with_attr("style", format!("{property}: {}", sizes.join(" ")))
        .with_children(layers.into_iter().map(|layer| layer.node).collect());
    children.push(container.into_node());
}

/// Rewrites images in `children`; returns true when the children are nothing
/// but absolutely positioned images.
fn process_children(children: &mut Vec<Node>, options: ImageOptions, layers: &mut Vec<Layer>) -> bool {
    let mut absolute_images = 0;
    let mut flow_content = false;

    children.retain_mut(|node| match node {
        Node::Image(image) => {
            let (display, annotation) = split_alt(&image.alt);
            let style = ImageStyle::parse(annotation);
            if style.background {
                layers.push(background_layer(image, &style));
                return false;
            }
            if style.is_absolute() {
                absolute_images += 1;
            } else {
                flow_content = true;
            }
            let display = display.to_string();
            *node = inline_image(image, display, &style, options);
            true
        }
        Node::Element(element) => {
            let absolute_only = process_children(&mut element.children, options, layers);
            if absolute_only {
                if element.transparent {
                    absolute_images += 1;
                    return true;
                }
                element.attrs.add_class("absolute-container");
            }
            flow_content = true;
            true
        }
        other => {
            flow_content |= !other.is_blank_text();
            true
        }
    });

    absolute_images > 0 && !flow_content
}

fn inline_image(image: &Image, display: String, style: &ImageStyle, options: ImageOptions) -> Node {
    let mut element = Element::new("img")
        .with_attr("src", image.url.as_str())
        .with_attr("alt", display);
    if let Some(title) = &image.title {
        element = element.with_attr("title", title.as_str());
    }
    element.attrs.merge_bag(&style.extra);
    if let Some(inline) = style.inline_style() {
        element = element.with_attr("style", inline);
    }
    if options.lazy {
        element = element.with_attr("loading", "lazy");
    }
    element.into_node()
}

fn background_layer(image: &Image, style: &ImageStyle) -> Layer {
    let mut element = Element::new("div").with_class("advanced-bg-image");
    element.attrs.merge_bag(&style.extra);
    element = element.with_attr("style", style.background_style(&image.url));
    Layer {
        node: element.into_node(),
        size: style.size.clone().unwrap_or_else(|| "1fr".to_string()),
        vertical: style.vertical,
    }
}

/// Removes `p` elements left with nothing but whitespace.
fn prune_empty_paragraphs(children: &mut Vec<Node>) {
    children.retain_mut(|node| {
        let Node::Element(element) = node else {
            return true;
        };
        prune_empty_paragraphs(&mut element.children);
        !(element.tag == "p" && element.children.iter().all(Node::is_blank_text))
    });
}
