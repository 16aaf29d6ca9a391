//! Template expressions in slide text.
//!
//! PowerPoint splits text into runs wherever formatting, spell checking or
//! editing history says so, which routinely cuts a `${...}` expression into
//! several runs. Substitution therefore works on run spans:
//!
//! 1. [`find_spans`] groups the runs of a paragraph into spans, each from
//!    the first run containing `${` to the first run containing `}`.
//! 2. The span text is rendered, and [`plan_span`] redistributes the result
//!    over the span's runs by their original lengths.
//! 3. [`render_text_runs`] applies the plan to the XML, keeping every run's
//!    properties and the paragraph structure.

use crate::common::xml::{general_ref_content, qname_prefix, qualify, text_content};
use crate::ooxml::error::OoxmlError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::Cursor;

/// Marker opening a template expression.
pub const EXPRESSION_OPEN: &str = "${";
/// Marker closing a template expression.
pub const EXPRESSION_CLOSE: char = '}';

/// Consecutive runs holding one expression, as inclusive run indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    pub first: usize,
    pub last: usize,
}

/// Group run texts into expression spans.
///
/// A span that is still open at the end of the paragraph runs to the last run.
pub fn find_spans<S: AsRef<str>>(runs: &[S]) -> Vec<RunSpan> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (index, run) in runs.iter().enumerate() {
        let text = run.as_ref();
        if open.is_none() && text.contains(EXPRESSION_OPEN) {
            open = Some(index);
        }
        if let Some(first) = open
            && text.contains(EXPRESSION_CLOSE)
        {
            spans.push(RunSpan { first, last: index });
            open = None;
        }
    }
    if let Some(first) = open {
        spans.push(RunSpan {
            first,
            last: runs.len() - 1,
        });
    }
    spans
}

/// New texts for the runs of a span, plus any text that did not fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanPlan {
    pub texts: Vec<String>,
    pub overflow: Option<String>,
}

/// Distribute `rendered` over runs whose original lengths (in characters)
/// are `lengths`.
///
/// Each run takes as many characters as it originally held, except that a
/// run with room for everything left takes all of it. Runs reached after
/// the text ran out are emptied.
pub fn plan_span(lengths: &[usize], rendered: &str) -> SpanPlan {
    let chars: Vec<char> = rendered.chars().collect();
    let mut start = 0;
    let mut texts = Vec::with_capacity(lengths.len());

    for &length in lengths {
        let remaining = chars.len() - start;
        if remaining == 0 {
            texts.push(String::new());
        } else if length < remaining {
            texts.push(chars[start..start + length].iter().collect());
            start += length;
        } else {
            texts.push(chars[start..].iter().collect());
            start = chars.len();
        }
    }

    let overflow = (start < chars.len()).then(|| chars[start..].iter().collect());
    SpanPlan { texts, overflow }
}

/// Render every expression in the top-level text shapes of a slide.
///
/// `render` receives the text of each span and returns its replacement.
/// Returns `None` when nothing changed.
pub fn render_text_runs<F, E>(xml: &[u8], mut render: F) -> Result<Option<Vec<u8>>, E>
where
    F: FnMut(&str) -> Result<String, E>,
    E: From<OoxmlError>,
{
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len())));
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraph: Vec<Event<'static>> = Vec::new();
    let mut paragraph_depth = 0usize;
    let mut changed = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(OoxmlError::from)?;

        if paragraph_depth > 0 {
            match &event {
                Event::Start(_) => paragraph_depth += 1,
                Event::End(_) => paragraph_depth -= 1,
                Event::Eof => return Err(OoxmlError::Xml("unclosed paragraph".to_string()).into()),
                _ => {},
            }
            paragraph.push(event.into_owned());
            if paragraph_depth == 0 {
                let (events, touched) = rewrite_paragraph(std::mem::take(&mut paragraph), &mut render)?;
                changed |= touched;
                for event in events {
                    writer.write_event(event).map_err(OoxmlError::from)?;
                }
            }
            buf.clear();
            continue;
        }

        let opens_paragraph = match &event {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if local == b"p" && in_top_level_text_body(&stack) {
                    true
                } else {
                    stack.push(local);
                    false
                }
            },
            Event::End(_) => {
                stack.pop();
                false
            },
            Event::Eof => break,
            _ => false,
        };

        if opens_paragraph {
            paragraph_depth = 1;
            paragraph.push(event.into_owned());
        } else {
            writer.write_event(event).map_err(OoxmlError::from)?;
        }
        buf.clear();
    }

    Ok(changed.then(|| writer.into_inner().into_inner()))
}

/// `p:spTree/p:sp/p:txBody`, the text body of a shape outside any group.
fn in_top_level_text_body(stack: &[Vec<u8>]) -> bool {
    match stack {
        [.., tree, sp, body] => tree == b"spTree" && sp == b"sp" && body == b"txBody",
        _ => false,
    }
}

/// Where one `a:r` sits in a buffered paragraph.
#[derive(Debug, Default)]
struct RunSlot {
    text: String,
    prefix: String,
    /// Events strictly between `<a:t>` and `</a:t>`
    content: Option<(usize, usize)>,
    /// An `<a:t/>` element
    empty_text: Option<usize>,
    /// Inclusive event range of `a:rPr`
    properties: Option<(usize, usize)>,
    /// Index of `</a:r>`
    end: usize,
}

fn local_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.local_name().as_ref().to_vec()
}

/// Locate the runs of a paragraph. `events[0]` is the paragraph's start tag.
fn scan_runs(events: &[Event<'static>]) -> Vec<RunSlot> {
    let mut runs = Vec::new();
    let mut current: Option<RunSlot> = None;
    let mut depth = 0usize;
    let mut properties_start = 0;
    let mut text_start: Option<usize> = None;

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(e) => {
                depth += 1;
                let local = local_name(e);
                if depth == 2 && local == b"r" {
                    current = Some(RunSlot {
                        prefix: qname_prefix(e),
                        ..Default::default()
                    });
                } else if depth == 3 && current.is_some() {
                    if local == b"rPr" {
                        properties_start = index;
                    } else if local == b"t" {
                        text_start = Some(index + 1);
                    }
                }
            },
            Event::Empty(e) if depth == 2 => {
                if let Some(run) = current.as_mut() {
                    match local_name(e).as_slice() {
                        b"rPr" => run.properties = Some((index, index)),
                        b"t" => run.empty_text = Some(index),
                        _ => {},
                    }
                }
            },
            Event::Text(t) if text_start.is_some() => {
                if let Some(run) = current.as_mut() {
                    run.text.push_str(&text_content(t));
                }
            },
            Event::GeneralRef(r) if text_start.is_some() => {
                if let Some(run) = current.as_mut() {
                    run.text.push_str(&general_ref_content(r));
                }
            },
            Event::CData(t) if text_start.is_some() => {
                if let Some(run) = current.as_mut() {
                    run.text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            },
            Event::End(e) => {
                let local = e.local_name().as_ref().to_vec();
                if depth == 3 && current.is_some() {
                    if let Some(run) = current.as_mut() {
                        if local == b"rPr" {
                            run.properties = Some((properties_start, index));
                        } else if local == b"t"
                            && let Some(start) = text_start.take()
                        {
                            run.content = Some((start, index));
                        }
                    }
                } else if depth == 2 && local == b"r" {
                    if let Some(mut run) = current.take() {
                        run.end = index;
                        runs.push(run);
                    }
                }
                depth = depth.saturating_sub(1);
            },
            _ => {},
        }
    }
    runs
}

fn text_event(text: &str) -> Event<'static> {
    Event::Text(BytesText::new(text).into_owned())
}

/// Events of a new run carrying `text` with a copy of `template`'s properties.
fn new_run(events: &[Event<'static>], template: &RunSlot, text: &str) -> Vec<Event<'static>> {
    let run_name = qualify(&template.prefix, "r");
    let text_name = qualify(&template.prefix, "t");
    let mut run = vec![Event::Start(BytesStart::new(run_name.clone()))];
    if let Some((first, last)) = template.properties {
        run.extend(events[first..=last].iter().cloned());
    }
    run.push(Event::Start(BytesStart::new(text_name.clone())));
    run.push(text_event(text));
    run.push(Event::End(BytesEnd::new(text_name)));
    run.push(Event::End(BytesEnd::new(run_name)));
    run
}

fn rewrite_paragraph<F, E>(events: Vec<Event<'static>>, render: &mut F) -> Result<(Vec<Event<'static>>, bool), E>
where
    F: FnMut(&str) -> Result<String, E>,
    E: From<OoxmlError>,
{
    let runs = scan_runs(&events);
    let texts: Vec<&str> = runs.iter().map(|run| run.text.as_str()).collect();
    let spans = find_spans(&texts);
    if spans.is_empty() {
        return Ok((events, false));
    }

    let mut replacements: HashMap<usize, String> = HashMap::new();
    let mut insertions: HashMap<usize, Vec<Event<'static>>> = HashMap::new();

    for span in spans {
        let span_runs = &runs[span.first..=span.last];
        let span_text: String = span_runs.iter().map(|run| run.text.as_str()).collect();
        let rendered = render(&span_text)?;
        if rendered == span_text {
            continue;
        }

        let lengths: Vec<usize> = span_runs.iter().map(|run| run.text.chars().count()).collect();
        let plan = plan_span(&lengths, &rendered);
        for (offset, text) in plan.texts.into_iter().enumerate() {
            replacements.insert(span.first + offset, text);
        }
        if let Some(overflow) = plan.overflow {
            let last = &runs[span.last];
            insertions.insert(last.end + 1, new_run(&events, last, &overflow));
        }
    }

    if replacements.is_empty() {
        return Ok((events, false));
    }

    // Event index -> what to do with it
    let mut skip = vec![false; events.len()];
    let mut text_before: HashMap<usize, String> = HashMap::new();
    let mut expand_empty: HashMap<usize, String> = HashMap::new();
    for (run_index, text) in replacements {
        let run = &runs[run_index];
        if let Some((start, end)) = run.content {
            skip[start..end].iter_mut().for_each(|s| *s = true);
            text_before.insert(end, text);
        } else if let Some(index) = run.empty_text {
            expand_empty.insert(index, text);
        }
    }

    let mut output = Vec::with_capacity(events.len() + 8);
    for (index, event) in events.into_iter().enumerate() {
        if let Some(inserted) = insertions.remove(&index) {
            output.extend(inserted);
        }
        if skip[index] {
            continue;
        }
        if let Some(text) = text_before.remove(&index) {
            if !text.is_empty() {
                output.push(text_event(&text));
            }
        }
        match expand_empty.remove(&index) {
            Some(text) => {
                let name = match &event {
                    Event::Empty(e) => String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    _ => "a:t".to_string(),
                };
                output.push(Event::Start(BytesStart::new(name.clone())));
                output.push(text_event(&text));
                output.push(Event::End(BytesEnd::new(name)));
            },
            None => output.push(event),
        }
    }
    Ok((output, true))
}
