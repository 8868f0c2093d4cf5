//! In-memory page doubles.
//!
//! [`FakeDom`] answers queries from an explicit list of the selectors each
//! element matches instead of parsing CSS, which is enough to exercise the
//! fallback chains deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::dom::{Dom, DomError, NodeRef};
use crate::host_api::HostApi;
use crate::notifier::{NotifySink, PlayerUpdate};

/// Element description used to populate a [`FakeDom`].
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    tag: String,
    matches: Vec<String>,
    attrs: HashMap<String, String>,
    props: HashMap<String, String>,
    text: Option<String>,
    disabled: bool,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            ..Default::default()
        }
    }

    /// Selector this element answers to.
    pub fn matching(mut self, selector: &str) -> Self {
        self.matches.push(selector.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn class(self, class_name: &str) -> Self {
        self.attr("class", class_name)
    }

    pub fn prop(mut self, name: &str, value: &str) -> Self {
        self.props.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Debug)]
struct FakeNode {
    element: FakeElement,
    parent: Option<usize>,
    connected: bool,
}

#[derive(Debug)]
struct FakeState {
    nodes: Vec<FakeNode>,
    location: String,
    clicks: Vec<usize>,
    inputs: Vec<(usize, String)>,
    failing: bool,
}

/// In-memory DOM.
#[derive(Debug)]
pub struct FakeDom {
    state: Mutex<FakeState>,
    queries: AtomicUsize,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDom {
    pub fn new() -> Self {
        let document = FakeNode {
            element: FakeElement::new("#document"),
            parent: None,
            connected: true,
        };
        Self {
            state: Mutex::new(FakeState {
                nodes: vec![document],
                location: "https://music.yandex.ru/".to_string(),
                clicks: Vec::new(),
                inputs: Vec::new(),
                failing: false,
            }),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> NodeRef {
        node_ref(0)
    }

    /// Append `element` under `parent` and return its handle.
    pub fn add(&self, parent: &NodeRef, element: FakeElement) -> NodeRef {
        let mut state = self.state.lock();
        let parent = index_of(parent).filter(|i| *i < state.nodes.len());
        state.nodes.push(FakeNode {
            element,
            parent,
            connected: true,
        });
        node_ref(state.nodes.len() - 1)
    }

    /// Detach a node and its subtree from the document.
    pub fn detach(&self, node: &NodeRef) {
        let mut state = self.state.lock();
        let Some(target) = index_of(node) else { return };
        for i in 0..state.nodes.len() {
            if is_inclusive_descendant(&state.nodes, i, target) {
                state.nodes[i].connected = false;
            }
        }
    }

    pub fn set_attr(&self, node: &NodeRef, name: &str, value: &str) {
        self.with_node(node, |el| {
            el.attrs.insert(name.to_string(), value.to_string());
        });
    }

    pub fn remove_attr(&self, node: &NodeRef, name: &str) {
        self.with_node(node, |el| {
            el.attrs.remove(name);
        });
    }

    pub fn set_prop(&self, node: &NodeRef, name: &str, value: &str) {
        self.with_node(node, |el| {
            el.props.insert(name.to_string(), value.to_string());
        });
    }

    pub fn set_text(&self, node: &NodeRef, text: &str) {
        self.with_node(node, |el| el.text = Some(text.to_string()));
    }

    pub fn set_location(&self, url: &str) {
        self.state.lock().location = url.to_string();
    }

    /// Make every accessor call fail with a script error.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    pub fn clicks(&self) -> Vec<NodeRef> {
        self.state.lock().clicks.iter().map(|i| node_ref(*i)).collect()
    }

    pub fn inputs(&self) -> Vec<(NodeRef, String)> {
        self.state
            .lock()
            .inputs
            .iter()
            .map(|(i, v)| (node_ref(*i), v.clone()))
            .collect()
    }

    /// Number of `query_selector` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn with_node(&self, node: &NodeRef, f: impl FnOnce(&mut FakeElement)) {
        let mut state = self.state.lock();
        if let Some(n) = index_of(node).and_then(|i| state.nodes.get_mut(i)) {
            f(&mut n.element);
        }
    }

    fn read<T>(
        &self,
        node: &NodeRef,
        f: impl FnOnce(&FakeState, usize) -> T,
    ) -> Result<T, DomError> {
        let state = self.state.lock();
        if state.failing {
            return Err(DomError::Script("page unavailable".to_string()));
        }
        let index = index_of(node)
            .filter(|i| *i < state.nodes.len())
            .ok_or_else(|| DomError::StaleHandle(node.id().to_string()))?;
        Ok(f(&state, index))
    }
}

fn node_ref(index: usize) -> NodeRef {
    NodeRef::new(format!("n{}", index))
}

fn index_of(node: &NodeRef) -> Option<usize> {
    node.id().strip_prefix('n')?.parse().ok()
}

fn is_inclusive_descendant(nodes: &[FakeNode], node: usize, ancestor: usize) -> bool {
    let mut current = Some(node);
    while let Some(i) = current {
        if i == ancestor {
            return true;
        }
        current = nodes[i].parent;
    }
    false
}

fn element_matches(element: &FakeElement, selector: &str) -> bool {
    element.matches.iter().any(|m| m == selector) || element.tag.eq_ignore_ascii_case(selector)
}

#[async_trait]
impl Dom for FakeDom {
    async fn document(&self) -> Result<NodeRef, DomError> {
        self.read(&self.root(), |_, i| node_ref(i))
    }

    async fn location(&self) -> Result<String, DomError> {
        self.read(&self.root(), |state, _| state.location.clone())
    }

    async fn query_selector(
        &self,
        scope: &NodeRef,
        selector: &str,
    ) -> Result<Option<NodeRef>, DomError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.read(scope, |state, scope| {
            (0..state.nodes.len())
                .find(|&i| {
                    i != scope
                        && state.nodes[i].connected
                        && element_matches(&state.nodes[i].element, selector)
                        && is_inclusive_descendant(&state.nodes, i, scope)
                })
                .map(node_ref)
        })
    }

    async fn closest(&self, node: &NodeRef, selector: &str) -> Result<Option<NodeRef>, DomError> {
        self.read(node, |state, start| {
            let mut current = Some(start);
            while let Some(i) = current {
                if i != 0 && element_matches(&state.nodes[i].element, selector) {
                    return Some(node_ref(i));
                }
                current = state.nodes[i].parent;
            }
            None
        })
    }

    async fn is_connected(&self, node: &NodeRef) -> Result<bool, DomError> {
        self.read(node, |state, i| state.nodes[i].connected)
    }

    async fn tag_name(&self, node: &NodeRef) -> Result<String, DomError> {
        self.read(node, |state, i| state.nodes[i].element.tag.clone())
    }

    async fn attribute(&self, node: &NodeRef, name: &str) -> Result<Option<String>, DomError> {
        self.read(node, |state, i| state.nodes[i].element.attrs.get(name).cloned())
    }

    async fn class_name(&self, node: &NodeRef) -> Result<String, DomError> {
        self.read(node, |state, i| {
            state.nodes[i]
                .element
                .attrs
                .get("class")
                .cloned()
                .unwrap_or_default()
        })
    }

    async fn text_content(&self, node: &NodeRef) -> Result<Option<String>, DomError> {
        self.read(node, |state, i| state.nodes[i].element.text.clone())
    }

    async fn property(&self, node: &NodeRef, name: &str) -> Result<Option<String>, DomError> {
        self.read(node, |state, i| state.nodes[i].element.props.get(name).cloned())
    }

    async fn is_disabled(&self, node: &NodeRef) -> Result<bool, DomError> {
        self.read(node, |state, i| state.nodes[i].element.disabled)
    }

    async fn click(&self, node: &NodeRef) -> Result<(), DomError> {
        let index = self.read(node, |_, i| i)?;
        self.state.lock().clicks.push(index);
        Ok(())
    }

    async fn set_input_value(&self, node: &NodeRef, value: &str) -> Result<(), DomError> {
        let index = self.read(node, |_, i| i)?;
        let mut state = self.state.lock();
        state.inputs.push((index, value.to_string()));
        state.nodes[index]
            .element
            .props
            .insert("value".to_string(), value.to_string());
        Ok(())
    }
}

/// Scriptable [`HostApi`]. Every capability starts absent.
#[derive(Debug, Default)]
pub struct FakeHostApi {
    track_id: Mutex<Option<String>>,
    progress: Mutex<Option<(f64, f64)>>,
    volume: Mutex<Option<f64>>,
    muted: Mutex<Option<bool>>,
    settable: Mutex<bool>,
    set_calls: Mutex<Vec<f64>>,
    mute_toggles: AtomicUsize,
    failing: Mutex<bool>,
}

impl FakeHostApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track_id(self, id: &str) -> Self {
        *self.track_id.lock() = Some(id.to_string());
        self
    }

    pub fn with_progress(self, now: f64, total: f64) -> Self {
        *self.progress.lock() = Some((now, total));
        self
    }

    pub fn with_volume(self, volume: f64) -> Self {
        *self.volume.lock() = Some(volume);
        self
    }

    pub fn with_mute(self, muted: bool) -> Self {
        *self.muted.lock() = Some(muted);
        self
    }

    /// Support `setVolume` and `toggleMute`.
    pub fn writable(self) -> Self {
        *self.settable.lock() = true;
        self
    }

    pub fn failing(self) -> Self {
        *self.failing.lock() = true;
        self
    }

    pub fn set_progress(&self, now: f64, total: f64) {
        *self.progress.lock() = Some((now, total));
    }

    pub fn set_calls(&self) -> Vec<f64> {
        self.set_calls.lock().clone()
    }

    pub fn mute_toggles(&self) -> usize {
        self.mute_toggles.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DomError> {
        if *self.failing.lock() {
            return Err(DomError::Script("externalAPI threw".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HostApi for FakeHostApi {
    async fn current_track_id(&self) -> Result<Option<String>, DomError> {
        self.check()?;
        Ok(self.track_id.lock().clone())
    }

    async fn progress(&self) -> Result<Option<f64>, DomError> {
        self.check()?;
        Ok(self.progress.lock().map(|(now, _)| now))
    }

    async fn duration(&self) -> Result<Option<f64>, DomError> {
        self.check()?;
        Ok(self.progress.lock().map(|(_, total)| total))
    }

    async fn volume(&self) -> Result<Option<f64>, DomError> {
        self.check()?;
        Ok(*self.volume.lock())
    }

    async fn is_muted(&self) -> Result<Option<bool>, DomError> {
        self.check()?;
        Ok(*self.muted.lock())
    }

    async fn set_volume(&self, fraction: f64) -> Result<bool, DomError> {
        self.check()?;
        if !*self.settable.lock() {
            return Ok(false);
        }
        self.set_calls.lock().push(fraction);
        *self.volume.lock() = Some(fraction);
        Ok(true)
    }

    async fn toggle_mute(&self) -> Result<bool, DomError> {
        self.check()?;
        if !*self.settable.lock() {
            return Ok(false);
        }
        self.mute_toggles.fetch_add(1, Ordering::SeqCst);
        let mut muted = self.muted.lock();
        *muted = Some(!muted.unwrap_or(false));
        Ok(true)
    }
}

/// Sink that records every delivered message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Delivered messages decoded back into updates.
    pub fn updates(&self) -> Vec<PlayerUpdate> {
        self.messages
            .lock()
            .iter()
            .filter_map(|m| serde_json::from_str(m).ok())
            .collect()
    }
}

impl NotifySink for RecordingSink {
    fn deliver(&self, message: String) {
        self.messages.lock().push(message);
    }
}

/// Selectors used by [`player_page`], one per default chain.
pub mod sel {
    pub const SCOPE: &str = "[data-test-id='PLAYERBAR_DESKTOP']";
    pub const TITLE: &str = "[data-test-id='TRACK_TITLE']";
    pub const ARTIST: &str = "[data-test-id='SEPARATED_ARTIST_TITLE']";
    pub const COVER: &str = "img[data-test-id='ENTITY_COVER_IMAGE']";
    pub const PLAY_PAUSE: &str = "button[class*='pause'], button[class*='play'], [data-test-id='PAUSE_BUTTON'], [data-test-id='PLAY_BUTTON']";
    pub const PAUSE: &str = "button[class*='pause'], [data-test-id='PAUSE_BUTTON']";
    pub const NEXT: &str = "[data-test-id='NEXT_TRACK_BUTTON']";
    pub const PREV: &str = "[data-test-id='PREVIOUS_TRACK_BUTTON']";
    pub const LIKE: &str = "[data-test-id='LIKE_BUTTON']";
    pub const DISLIKE: &str = "[data-test-id='DISLIKE_BUTTON']";
    pub const TIMELINE: &str = "input[data-test-id='TIMECODE_SLIDER'], input[type='range']";
    pub const TIME_NOW: &str = "[data-test-id='TIMECODE_TIME_START']";
    pub const TIME_END: &str = "[data-test-id='TIMECODE_TIME_END']";
    pub const VOLUME: &str = "input[data-test-id='VOLUME_SLIDER']";
    pub const MUTE: &str = "button[data-test-id='VOLUME_BUTTON']";
    pub const TRACK_LINK: &str = "a[href*='/track/']";
}

/// Handles to the elements of a page built by [`player_page`].
#[derive(Debug, Clone)]
pub struct PlayerPage {
    pub bar: NodeRef,
    pub title: NodeRef,
    pub artist: NodeRef,
    pub cover: NodeRef,
    pub play: NodeRef,
    pub next: NodeRef,
    pub prev: NodeRef,
    pub like: NodeRef,
    pub dislike: NodeRef,
    pub time_now: NodeRef,
    pub time_end: NodeRef,
    pub volume: NodeRef,
    pub mute: NodeRef,
}

/// A paused player bar: "Song" by "Artist", track 555, 0:30 of 3:00, volume
/// slider at 0.4 on a 0..1 scale, nothing liked.
pub fn player_page(dom: &FakeDom) -> PlayerPage {
    let root = dom.root();
    let bar = dom.add(&root, FakeElement::new("div").matching(sel::SCOPE));
    let title = dom.add(
        &bar,
        FakeElement::new("a")
            .matching(sel::TITLE)
            .matching(sel::TRACK_LINK)
            .prop("href", "https://music.yandex.ru/album/1/track/555")
            .text("  Song  "),
    );
    let artist = dom.add(&bar, FakeElement::new("span").matching(sel::ARTIST).text("Artist"));
    let cover = dom.add(
        &bar,
        FakeElement::new("img")
            .matching(sel::COVER)
            .prop("src", "https://avatars.yandex.net/get-music-content/1/abc/100x100"),
    );
    let play = dom.add(
        &bar,
        FakeElement::new("button")
            .matching(sel::PLAY_PAUSE)
            .class("BaseSonataControls_play")
            .attr("data-test-id", "PLAY_BUTTON"),
    );
    let next = dom.add(&bar, FakeElement::new("button").matching(sel::NEXT));
    let prev = dom.add(&bar, FakeElement::new("button").matching(sel::PREV));
    let like = dom.add(
        &bar,
        FakeElement::new("button").matching(sel::LIKE).attr("aria-pressed", "false"),
    );
    let dislike = dom.add(
        &bar,
        FakeElement::new("button").matching(sel::DISLIKE).attr("aria-pressed", "false"),
    );
    let time_now = dom.add(&bar, FakeElement::new("span").matching(sel::TIME_NOW).text("0:30"));
    let time_end = dom.add(&bar, FakeElement::new("span").matching(sel::TIME_END).text("3:00"));
    let volume = dom.add(
        &bar,
        FakeElement::new("input")
            .matching(sel::VOLUME)
            .prop("value", "0.4")
            .prop("max", "1"),
    );
    let mute = dom.add(
        &bar,
        FakeElement::new("button")
            .matching(sel::MUTE)
            .class("ChangeVolume_button"),
    );
    PlayerPage {
        bar,
        title,
        artist,
        cover,
        play,
        next,
        prev,
        like,
        dislike,
        time_now,
        time_end,
        volume,
        mute,
    }
}
