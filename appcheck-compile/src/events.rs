//! Event handler properties of the built-in widget classes.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventSignature {
    pub event: &'static str,
    pub params: &'static [&'static str],
}

const fn event(event: &'static str, params: &'static [&'static str]) -> EventSignature {
    EventSignature { event, params }
}

const WIDGET: &[&str] = &["widget"];
const WIDGET_EVENT: &[&str] = &["widget", "event"];
const WIDGET_NEW_VALUE: &[&str] = &["widget", "newValue"];
const WIDGET_NEW_VALUES: &[&str] = &["widget", "newValues"];

const CLICKABLE_EVENTS: &[EventSignature] = &[
    event("onClick", WIDGET_EVENT),
    event("onLoad", WIDGET),
    event("onDataLoad", WIDGET),
    event("onUnload", WIDGET),
];

const VALUE_EVENTS: &[EventSignature] = &[
    event("onValidate", WIDGET_NEW_VALUE),
    event("onChange", WIDGET_NEW_VALUE),
    event("onValueEdit", WIDGET_NEW_VALUE),
    event("onLoad", WIDGET),
    event("onDataLoad", WIDGET),
    event("onUnload", WIDGET),
];

const MULTI_VALUE_EVENTS: &[EventSignature] = &[
    event("onValidate", WIDGET_NEW_VALUE),
    event("onValuesChange", WIDGET_NEW_VALUES),
    event("onLoad", WIDGET),
    event("onDataLoad", WIDGET),
    event("onUnload", WIDGET),
];

/// Events of `class` in extraction order. Unknown classes have none.
pub fn events_of(class: &str) -> &'static [EventSignature] {
    match class {
        "SimpleButton" | "Panel" | "SimpleLabel" => CLICKABLE_EVENTS,
        "Dropdown" | "CheckBoxComponent" => VALUE_EVENTS,
        "MultiSelectBox" => MULTI_VALUE_EVENTS,
        _ => &[],
    }
}

/// JSDoc type of a handler parameter on a widget of `class`.
pub fn param_type<'a>(param: &str, class: &'a str) -> &'a str {
    match param {
        "widget" => class,
        "event" => "Event",
        "newValues" => "unknown[]",
        _ => "unknown",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table() {
        let events = |class: &str| -> Vec<&str> {
            events_of(class).iter().map(|sig| sig.event).collect()
        };

        assert_eq!(events("SimpleButton"), ["onClick", "onLoad", "onDataLoad", "onUnload"]);
        assert_eq!(events("Panel"), events("SimpleLabel"));
        assert_eq!(
            events("CheckBoxComponent"),
            ["onValidate", "onChange", "onValueEdit", "onLoad", "onDataLoad", "onUnload"]
        );
        assert_eq!(
            events("MultiSelectBox"),
            ["onValidate", "onValuesChange", "onLoad", "onDataLoad", "onUnload"]
        );
        assert!(events_of("LayoutWidget").is_empty());
        assert!(events_of("ViewFragment").is_empty());
    }

    #[test]
    fn params() {
        assert_eq!(events_of("Panel")[0].params, ["widget", "event"]);
        assert_eq!(events_of("Dropdown")[1].params, ["widget", "newValue"]);
        assert_eq!(events_of("MultiSelectBox")[1].params, ["widget", "newValues"]);
        assert_eq!(param_type("widget", "Dropdown"), "Dropdown");
        assert_eq!(param_type("event", "Panel"), "Event");
        assert_eq!(param_type("newValue", "Dropdown"), "unknown");
        assert_eq!(param_type("newValues", "MultiSelectBox"), "unknown[]");
    }
}
