use anchored_list::{Controller, DataSource, Item, LayoutOptions, Viewport};

#[derive(Clone, Debug, PartialEq)]
struct Message {
    id: u64,
    text: String,
}

impl Item for Message {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

fn message(id: u64) -> Message {
    Message {
        id,
        text: format!("message #{id}"),
    }
}

fn main() {
    // Taller rows for longer messages; the host would measure after rendering instead.
    let opts = LayoutOptions::new(24)
        .with_width(320)
        .with_size_oracle(|_, id: &u64, _| Some(20 + (*id % 3) as u32 * 8));

    let mut history = DataSource::with_items((100..110).map(message));
    let mut view = Controller::new(opts);
    view.sync(&history);

    // The host scrolls to the newest message.
    let bounds = view.store().content_bounds();
    let mut scroll = bounds.map_or(0, |b| b.bottom.saturating_sub(120));
    println!("initial bounds={bounds:?} insets={:?}", view.insets());

    // Older pages load above; the viewport stays on the same messages.
    for page in 0..3u64 {
        let first = 100 - (page + 1) * 10;
        history.prepend((first..first + 10).map(message));
        let out = view.sync(&history);
        scroll = scroll.saturating_add_signed(out.scroll_adjustment);

        let visible = view.visible_range(Viewport::new(scroll, 120));
        println!(
            "page {page}: applied={} insets={:?} visible={visible:?}",
            out.applied,
            view.insets()
        );
    }

    // A new message arrives and one is edited.
    history.append([message(110)]);
    let mut edited = message(105);
    edited.text.push_str(" (edited)");
    history.update([edited]);
    let out = view.sync(&history);
    println!("live update: {out:?}");

    // The host reports a measured height after rendering.
    if let Some(index) = view.store().index_of(&110) {
        let delta = view.store_mut().measure(index, 64);
        println!("measured #110: delta={delta}");
    }

    view.store().for_each_visible_item(Viewport::new(scroll, 120), |id, item| {
        println!("  #{id} at {} (+{})", item.position, item.extent);
    });
}
