use pageflow::{
    BackgroundMode, Canvas, Color, Command, DocContext, Document, Flowable, FrameBackground,
    FrameSpec, Indenter, NextPageTemplate, Page, PageTemplate, Paragraph, Pt, Rect, Size, Spacer,
    TextStyle, multi_build,
};

const CM: f32 = 28.346_457;

fn heading(text: &str) -> Flowable {
    Paragraph::new(text)
        .with_style(TextStyle::sized(18.0).with_spacing(18.0, 6.0))
        .into()
}

fn body(text: impl Into<String>) -> Flowable {
    Paragraph::new(text)
        .with_style(TextStyle::sized(10.0).with_spacing(6.0, 0.0))
        .into()
}

fn spam_body(lead: &str) -> Flowable {
    body(format!("{lead} {}", "spam ".repeat(25)))
}

fn page_number_footer(canvas: &mut Canvas, context: &DocContext) {
    canvas.stroke_rect(Rect::new(2.5 * CM, 2.5 * CM, 15.0 * CM, 25.0 * CM));
    canvas.set_font_name("Times-Roman");
    canvas.set_font_size(Pt::from_i32(12));
    canvas.draw_string(
        Pt::from_f32(10.0 * CM),
        Pt::from_f32(CM),
        context.page_number.to_string(),
    );
}

fn templates() -> Vec<PageTemplate> {
    let normal = PageTemplate::new("normal", Size::a4())
        .with_frame("F1", Rect::new(2.5 * CM, 2.5 * CM, 15.0 * CM, 25.0 * CM))
        .set_on_page(page_number_footer);
    let updown = PageTemplate::new("updown", Size::a4())
        .with_frame_spec(
            FrameSpec::new("F2", Rect::new(2.5 * CM, 2.5 * CM, 15.0 * CM, 10.0 * CM))
                .with_boundary(true),
        )
        .with_frame_spec(
            FrameSpec::new("F3", Rect::new(2.5 * CM, 16.0 * CM, 15.0 * CM, 10.0 * CM))
                .with_boundary(true),
        );
    vec![normal, updown]
}

fn indentation_story() -> Vec<Flowable> {
    let mut story: Vec<Flowable> = vec![
        heading("Test of context-relative indentation"),
        Spacer::new(18.0, 18.0).into(),
    ];

    story.push(Indenter::new(0.0, 0.0).into());
    story.push(spam_body("This should be indented 0 points at each edge."));
    story.push(Indenter::new(0.0, 0.0).into());

    story.push(Indenter::new(36.0, 0.0).into());
    story.push(spam_body("This should be indented 36 points at the left."));
    story.push(Indenter::new(-36.0, 0.0).into());

    story.push(Indenter::new(0.0, 36.0).into());
    story.push(spam_body("This should be indented 36 points at the right."));
    story.push(Indenter::new(0.0, -36.0).into());

    story.push(Indenter::new(36.0, 36.0).into());
    story.push(spam_body("This should be indented 36 points at each edge."));
    story.push(Indenter::new(36.0, 36.0).into());
    story.push(spam_body("This should be indented a FURTHER 36 points at each edge."));
    story.push(Indenter::new(-72.0, -72.0).into());

    story.push(spam_body("This should be back to normal at each edge."));

    story.push(Indenter::new(36.0, 36.0).into());
    story.push(body(
        "This should be indented 36 points at the left and right. It should run over \
         more than one page and the indent should continue on the next page. xxxxx "
            .repeat(20),
    ));
    story.push(Indenter::new(-36.0, -36.0).into());

    story.push(NextPageTemplate::new("updown").into());
    story.push(Flowable::FrameBreak);
    story.push(heading("Another test of context-relative indentation"));
    story.push(NextPageTemplate::new("normal").into());
    story.push(body(
        "This time we see if the indent level is continued across frames...this page \
         has 2 frames, let's see if it carries top to bottom. Then onto a totally \
         different template.",
    ));

    story.push(Indenter::new(0.0, 0.0).into());
    story.push(spam_body("This should be indented 0 points at each edge."));
    story.push(Indenter::new(0.0, 0.0).into());
    story.push(Indenter::new(36.0, 72.0).into());
    story.push(body(
        "This should be indented 36 points at the left and 72 at the right. It should \
         run over more than one frame and one page, and the indent should continue on \
         the next page. xxxxx "
            .repeat(35),
    ));
    story.push(Indenter::new(-36.0, -72.0).into());
    story.push(spam_body("This should be back to normal at each edge."));
    story.push(Flowable::PageBreak);

    story.push(Flowable::PageBreak);
    story.push(body("Below we should colour the background lightgreen"));
    story.push(FrameBackground::start(BackgroundMode::Tail, Color::LIGHT_GREEN).into());
    for _ in 0..3 {
        story.push(body("We should have a light green background here"));
    }
    story.push(FrameBackground::stop().into());

    story.push(Flowable::PageBreak);
    story.push(body("Below we should colour the whole frame lightgreen"));
    story.push(FrameBackground::start(BackgroundMode::Frame, Color::LIGHT_GREEN).into());
    story.push(body("We should have a light green frame here"));

    story.push(Flowable::PageBreak);
    story.push(body("Here we should have no background."));

    story.push(Flowable::PageBreak);
    story.push(FrameBackground::start(BackgroundMode::Frame, Color::LIGHT_BLUE).into());
    story.push(body(
        "We should have a light blue background here and the whole frame should be filled in.",
    ));

    story.push(Flowable::PageBreak);
    story.push(body("Here we should have no background again."));
    story.push(body("Below we should colour the background permanently"));
    story.push(FrameBackground::start(BackgroundMode::FramePermanent, Color::LIGHT_GREEN).into());
    story.push(body("We should have a permanent light green background here"));

    story.push(Flowable::PageBreak);
    story.push(body("Here we should still have a lightgreen background."));

    story.push(Flowable::PageBreak);
    story.push(
        FrameBackground::start(BackgroundMode::Frame, Color::LIGHT_BLUE)
            .with_insets(36.0, 36.0)
            .into(),
    );
    story.push(body("We should have a lighgreen/lightblue background."));

    story.push(Flowable::PageBreak);
    story.push(body("Here we should have only light green background."));
    story
}

fn build() -> Document {
    let outcome = multi_build(indentation_story(), templates(), "normal", 4).expect("multi build");
    assert_eq!(outcome.passes, 2);
    assert_eq!(outcome.page_counts[0], outcome.page_counts[1]);
    outcome.document
}

fn page_starting_with<'a>(document: &'a Document, prefix: &str) -> (usize, &'a Page) {
    document
        .pages
        .iter()
        .enumerate()
        .find(|(_, page)| {
            page.commands.iter().any(|command| {
                matches!(command, Command::DrawString { text, .. } if text.starts_with(prefix))
            })
        })
        .unwrap_or_else(|| panic!("no page draws {prefix:?}"))
}

fn fills(page: &Page) -> Vec<(Color, Rect)> {
    let mut out = Vec::new();
    let mut color = None;
    for command in &page.commands {
        match command {
            Command::SetFillColor(c) => color = Some(*c),
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                if let Some(c) = color.take() {
                    out.push((
                        c,
                        Rect {
                            x: *x,
                            y: *y,
                            width: *width,
                            height: *height,
                        },
                    ));
                }
            }
            _ => {}
        }
    }
    out
}

fn close(actual: Pt, expected: f32) -> bool {
    (actual.to_f32() - expected).abs() < 0.01
}

#[test]
fn indent_levels_match_their_markers() {
    let document = build();
    let bounds = document.pages[0].flowable_bounds();
    let left = 2.5 * CM;
    let width = 15.0 * CM;
    // heading, spacer, then one box per paragraph in story order.
    let expected = [
        (left, width),
        (left + 36.0, width - 36.0),
        (left, width - 36.0),
        (left + 36.0, width - 72.0),
        (left + 72.0, width - 144.0),
        (left, width),
    ];
    for (offset, (x, w)) in expected.iter().enumerate() {
        let rect = bounds[offset + 2];
        assert!(close(rect.x, *x), "paragraph {offset}: x {}", rect.x.to_f32());
        assert!(close(rect.width, *w), "paragraph {offset}: width {}", rect.width.to_f32());
    }
}

#[test]
fn long_indented_paragraph_keeps_its_indent_on_the_next_page() {
    let document = build();
    let continuation = document.pages[1].flowable_bounds()[0];
    assert!(close(continuation.x, 2.5 * CM + 36.0));
    assert!(close(continuation.width, 15.0 * CM - 72.0));
}

#[test]
fn template_switch_and_frame_break_route_through_updown() {
    let document = build();
    let (index, page) = page_starting_with(&document, "Another test");
    assert_eq!(page.template_name(), Some("updown"));
    assert!(
        document.pages[index + 1..]
            .iter()
            .all(|later| later.template_name() == Some("normal"))
    );
    // Both frames of the updown page are outlined.
    let strokes = page
        .commands
        .iter()
        .filter(|command| **command == Command::Stroke)
        .count();
    assert_eq!(strokes, 2);
}

#[test]
fn every_normal_page_carries_its_number() {
    let document = build();
    for (index, page) in document.pages.iter().enumerate() {
        if page.template_name() != Some("normal") {
            continue;
        }
        let number = (index + 1).to_string();
        assert!(page.commands.iter().any(|command| {
            matches!(command, Command::DrawString { text, .. } if *text == number)
        }));
    }
}

#[test]
fn background_modes_paint_the_expected_regions() {
    let document = build();
    let frame = Rect::new(2.5 * CM, 2.5 * CM, 15.0 * CM, 25.0 * CM);

    let (_, tail) = page_starting_with(&document, "Below we should colour the background lightgreen");
    let tail_fills = fills(tail);
    assert_eq!(tail_fills.len(), 1);
    assert_eq!(tail_fills[0].0, Color::LIGHT_GREEN);
    assert!(tail_fills[0].1.y > frame.y);
    assert!(tail_fills[0].1.height < frame.height);

    let (_, whole) = page_starting_with(&document, "Below we should colour the whole frame");
    assert_eq!(fills(whole), vec![(Color::LIGHT_GREEN, frame)]);

    let (_, none) = page_starting_with(&document, "Here we should have no background.");
    assert!(fills(none).is_empty());

    let (_, blue) = page_starting_with(&document, "We should have a light blue");
    assert_eq!(fills(blue), vec![(Color::LIGHT_BLUE, frame)]);

    let (_, permanent) = page_starting_with(&document, "Here we should have no background again.");
    assert_eq!(fills(permanent), vec![(Color::LIGHT_GREEN, frame)]);

    let (_, still) = page_starting_with(&document, "Here we should still have");
    assert_eq!(fills(still), vec![(Color::LIGHT_GREEN, frame)]);

    let (_, inset) = page_starting_with(&document, "We should have a lighgreen/lightblue");
    let inset_rect = Rect {
        x: frame.x + Pt::from_i32(36),
        width: frame.width - Pt::from_i32(72),
        ..frame
    };
    assert_eq!(fills(inset), vec![(Color::LIGHT_BLUE, inset_rect)]);

    // The page-only start overrode the permanent paint for one page only.
    let (_, after) = page_starting_with(&document, "Here we should have only light green");
    assert_eq!(fills(after), vec![(Color::LIGHT_GREEN, frame)]);
}
