use super::*;
use crate::content::Content;
use crate::content::parameters::Parameters;
use crate::foundation::core::{PixelFormat, Size};
use crate::host::frame::FrameImage;

struct NoContent;

impl ContentFactory for NoContent {
    fn create_content(
        &self,
        _size: Size,
        _parameters: Arc<dyn Parameters>,
    ) -> VfxResult<Box<dyn Content>> {
        Err(VfxError::content("unused"))
    }
}

fn filter() -> Arc<EffectService> {
    create_filter(Arc::new(NoContent), ServiceOpts::default())
}

#[test]
fn length_counts_inclusive_points() {
    let svc = filter();
    svc.set_in_and_out(10, 19);
    assert_eq!(svc.length(), 10);

    let frame = Frame::new(15, FrameImage::solid(Size::new(1, 1), PixelFormat::Rgb24, [0; 4]));
    assert_eq!(svc.position(&frame), 5);
}

#[test]
fn length_is_never_below_one() {
    let svc = filter();
    assert_eq!(svc.length(), 1);
    svc.set_in_and_out(5, 2);
    assert_eq!(svc.length(), 1);
}

#[test]
fn timeout_property_overrides_option() {
    let svc = filter();
    assert_eq!(svc.render_timeout(), Some(DEFAULT_RENDER_TIMEOUT));

    svc.properties().set_int(RENDER_TIMEOUT_PROPERTY, 250);
    assert_eq!(svc.render_timeout(), Some(Duration::from_millis(250)));

    svc.properties().set_int(RENDER_TIMEOUT_PROPERTY, 0);
    assert_eq!(svc.render_timeout(), None);
}

#[test]
fn services_get_distinct_ids() {
    assert_ne!(filter().id(), filter().id());
}

#[test]
fn resource_option_seeds_property() {
    let svc = create_transition(
        Arc::new(NoContent),
        ServiceOpts {
            resource: Some("plain:a.html".to_string()),
            ..ServiceOpts::default()
        },
    );
    assert_eq!(svc.kind(), EffectKind::Transition);
    assert_eq!(
        svc.properties().get_string(RESOURCE_PROPERTY).as_deref(),
        Some("plain:a.html")
    );
}
