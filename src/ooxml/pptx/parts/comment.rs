/// Comment parts for PowerPoint presentations.
///
/// Slides reach their comments through a `comments` relationship to a
/// `/ppt/comments/commentN.xml` part holding one `p:cm` per comment.
use crate::ooxml::error::Result;
use crate::ooxml::opc::part::Part;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Comments part (`p:cmLst`).
pub struct CommentsPart<'a> {
    /// The underlying OPC part
    part: &'a dyn Part,
}

impl<'a> CommentsPart<'a> {
    /// Create a CommentsPart from an OPC Part.
    pub fn from_part(part: &'a dyn Part) -> Result<Self> {
        Ok(Self { part })
    }

    /// Number of comments in the list.
    pub fn comment_count(&self) -> Result<usize> {
        let mut reader = Reader::from_reader(self.part.blob());
        reader.config_mut().trim_text(true);

        let mut depth = 0usize;
        let mut count = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    if depth == 1 && e.local_name().as_ref() == b"cm" {
                        count += 1;
                    }
                    depth += 1;
                },
                Event::Empty(e) => {
                    if depth == 1 && e.local_name().as_ref() == b"cm" {
                        count += 1;
                    }
                },
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(count)
    }

    /// Get the underlying OPC part.
    #[inline]
    pub fn part(&self) -> &'a dyn Part {
        self.part
    }
}
