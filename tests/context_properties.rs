use std::rc::Rc;

use plotctx::mark::MarkKind;
use plotctx::scale::{Scale, ScaleKind, ScaleRegistry, ScaleType};
use plotctx::sync::{RecordingChannel, SyncMessage};
use plotctx::{ArrayData, Context, FigureOptions, MarkArgs, PlotConfig, PlotError, ScaleSpec};

fn recording() -> (Context, Rc<RecordingChannel>) {
    let channel = Rc::new(RecordingChannel::new());
    let ctx = Context::new(PlotConfig::default(), channel.clone());
    (ctx, channel)
}

fn line(ctx: &mut Context, ys: Vec<f64>) -> plotctx::mark::MarkRef {
    ctx.plot(None, ArrayData::floats(ys), None, MarkArgs::new())
        .expect("plot failed")
}

#[test]
fn test_consecutive_marks_reuse_context_scales() {
    let (mut ctx, _) = recording();
    let first = line(&mut ctx, vec![1.0, 2.0, 3.0]);
    let second = line(&mut ctx, vec![10.0, 20.0]);

    for name in ["x", "y"] {
        let a = first.borrow().scale(name).cloned().unwrap();
        let b = second.borrow().scale(name).cloned().unwrap();
        assert!(a.ptr_eq(&b), "'{}' scale was not shared", name);
    }
}

#[test]
fn test_axes_are_not_duplicated_for_shared_scales() {
    let (mut ctx, _) = recording();
    line(&mut ctx, vec![1.0, 2.0]);
    line(&mut ctx, vec![3.0, 4.0]);
    ctx.scatter(
        ArrayData::floats(vec![0.0]),
        ArrayData::floats(vec![5.0]),
        MarkArgs::new(),
    )
    .unwrap();

    let figure = ctx.current_figure();
    assert_eq!(figure.borrow().marks().len(), 3);
    assert_eq!(figure.borrow().axes().len(), 2);
}

#[test]
fn test_explicit_scale_beats_context_scale() {
    let (mut ctx, _) = recording();
    let first = line(&mut ctx, vec![1.0, 2.0]);
    let log = Scale::handle(ScaleKind::Log);

    let second = ctx
        .plot(
            None,
            ArrayData::floats(vec![1.0, 100.0]),
            None,
            MarkArgs::new().scale("y", log.clone()),
        )
        .unwrap();

    assert!(second.borrow().scale("y").unwrap().ptr_eq(&log));
    // x still comes from the context
    assert!(second
        .borrow()
        .scale("x")
        .unwrap()
        .ptr_eq(first.borrow().scale("x").unwrap()));
    // the explicit scale now owns the y dimension
    assert!(ctx.scale("y").unwrap().ptr_eq(&log));
}

#[test]
fn test_explicit_scale_without_context_update() {
    let (mut ctx, _) = recording();
    line(&mut ctx, vec![1.0, 2.0]);
    let before = ctx.scale("y").unwrap();
    let log = Scale::handle(ScaleKind::Log);

    ctx.plot(
        None,
        ArrayData::floats(vec![1.0, 100.0]),
        None,
        MarkArgs::new().scale("y", log).update_context(false),
    )
    .unwrap();

    assert!(ctx.scale("y").unwrap().ptr_eq(&before));
}

#[test]
fn test_keep_carries_outgoing_scale() {
    let (mut ctx, _) = recording();
    ctx.figure(FigureOptions::new().key("a")).unwrap();
    let mark = line(&mut ctx, vec![1.0, 2.0]);
    let x = mark.borrow().scale("x").cloned().unwrap();

    ctx.figure(FigureOptions::new().key("b").scale("x", ScaleSpec::Keep))
        .unwrap();
    assert!(ctx.scale("x").unwrap().ptr_eq(&x));
    assert!(ctx.scale("y").is_none());

    let next = line(&mut ctx, vec![5.0, 6.0]);
    assert!(next.borrow().scale("x").unwrap().ptr_eq(&x));
    assert!(!next
        .borrow()
        .scale("y")
        .unwrap()
        .ptr_eq(mark.borrow().scale("y").unwrap()));
}

#[test]
fn test_keep_with_replacement_scale() {
    let (mut ctx, _) = recording();
    let mark = line(&mut ctx, vec![1.0, 2.0]);
    let x = mark.borrow().scale("x").cloned().unwrap();
    let fresh = Scale::handle(ScaleKind::Log);

    ctx.figure(
        FigureOptions::new()
            .scale("x", ScaleSpec::Keep)
            .scale("y", ScaleSpec::Use(fresh.clone())),
    )
    .unwrap();

    assert_eq!(ctx.scales().len(), 2);
    assert!(ctx.scale("x").unwrap().ptr_eq(&x));
    assert!(ctx.scale("y").unwrap().ptr_eq(&fresh));
}

#[test]
fn test_highest_precedence_scale_wins() {
    let mut registry = ScaleRegistry::empty();
    registry.register(ScaleType::builtin(ScaleKind::Linear).with_precedence(1));
    registry.register(ScaleType::builtin(ScaleKind::Log).with_precedence(2));
    let mut ctx = Context::new(PlotConfig::default(), Rc::new(RecordingChannel::new()))
        .with_registry(registry);

    let mark = line(&mut ctx, vec![1.0, 10.0]);
    assert_eq!(mark.borrow().scale("y").unwrap().borrow().kind(), ScaleKind::Log);
}

#[test]
fn test_keyed_scale_contexts_are_isolated() {
    let (mut ctx, _) = recording();
    ctx.figure(FigureOptions::new().key("a")).unwrap();
    let in_a = line(&mut ctx, vec![1.0]);

    ctx.figure(FigureOptions::new().key("b")).unwrap();
    let in_b = line(&mut ctx, vec![2.0]);
    assert!(!in_a
        .borrow()
        .scale("y")
        .unwrap()
        .ptr_eq(in_b.borrow().scale("y").unwrap()));

    // returning to "a" restores its own bindings
    ctx.figure(FigureOptions::new().key("a")).unwrap();
    let again = line(&mut ctx, vec![3.0]);
    assert!(again
        .borrow()
        .scale("y")
        .unwrap()
        .ptr_eq(in_a.borrow().scale("y").unwrap()));
    assert_eq!(ctx.current_figure().borrow().marks().len(), 2);
}

#[test]
fn test_close_current_figure_resets_active_context() {
    let (mut ctx, channel) = recording();
    let figure = ctx.figure(FigureOptions::new().key("a")).unwrap();
    line(&mut ctx, vec![1.0, 2.0]);

    ctx.close("a").unwrap();

    assert!(!ctx.has_figure("a"));
    assert!(!ctx.has_scale_context("a"));
    assert!(ctx.scales().is_empty());
    let current = ctx.current_figure();
    assert!(!current.ptr_eq(&figure));
    assert!(current.borrow().marks().is_empty());
    assert!(current.borrow().axes().is_empty());
    assert!(channel.was_closed(figure.id()));
}

#[test]
fn test_close_unknown_key_is_ignored() {
    let (mut ctx, channel) = recording();
    ctx.figure(FigureOptions::new().key("a")).unwrap();
    channel.clear();
    ctx.close("missing").unwrap();
    assert!(channel.is_empty());
    assert!(ctx.has_figure("a"));
}

#[test]
fn test_no_compatible_scale_is_an_error() {
    let channel = Rc::new(RecordingChannel::new());
    let mut ctx =
        Context::new(PlotConfig::default(), channel.clone()).with_registry(ScaleRegistry::empty());

    let err = ctx
        .draw_mark(
            MarkKind::Scatter,
            MarkArgs::new()
                .data("x", ArrayData::floats(vec![1.0]))
                .data("y", ArrayData::floats(vec![2.0])),
        )
        .unwrap_err();

    assert!(matches!(err, PlotError::NoCompatibleScale { .. }));
    assert!(ctx.current_figure().borrow().marks().is_empty());
}

#[test]
fn test_new_scales_are_opened_once() {
    let (mut ctx, channel) = recording();
    let first = line(&mut ctx, vec![1.0, 2.0]);
    line(&mut ctx, vec![3.0, 4.0]);

    let x_id = first.borrow().scale("x").unwrap().id();
    let opens = channel
        .messages()
        .iter()
        .filter(|m| matches!(m, SyncMessage::Open { id, .. } if *id == x_id))
        .count();
    assert_eq!(opens, 1);
}

#[test]
fn test_failed_draw_leaves_context_untouched() {
    let (mut ctx, channel) = recording();
    let err = ctx
        .plot(
            None,
            ArrayData::floats(vec![1.0, 2.0]),
            None,
            MarkArgs::new().data("color", ArrayData::bools(vec![true, false])),
        )
        .unwrap_err();
    assert!(matches!(err, PlotError::NoCompatibleScale { .. }));
    assert!(ctx.scales().is_empty());
    assert!(ctx.last_mark().is_none());

    let mark = line(&mut ctx, vec![3.0, 4.0]);
    let mark = mark.borrow();
    for name in ["x", "y"] {
        let id = mark.scale(name).unwrap().id();
        let opens = channel
            .messages()
            .iter()
            .filter(|m| matches!(m, SyncMessage::Open { id: opened, .. } if *opened == id))
            .count();
        assert_eq!(opens, 1, "'{}' scale opened {} times", name, opens);
    }
}
