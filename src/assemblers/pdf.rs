use crate::error::{Error, Result};
use image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use image::{ColorType, ImageDecoder, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Turns an ordered list of raster images into one paged document
pub trait PageEncoder {
    /// One page per image, in slice order
    fn encode(&self, images: &[PathBuf], output: &Path) -> Result<()>;
}

/// Image-only PDF writer. JPEG pages are embedded as-is (`DCTDecode`);
/// other formats are re-encoded to JPEG first.
#[derive(Debug, Clone, Copy)]
pub struct PdfEncoder {
    jpeg_quality: u8,
}

impl Default for PdfEncoder {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Colour model of the embedded JPEG data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageColor {
    Gray,
    Rgb,
    /// Adobe-style inverted CMYK
    Cmyk,
}

impl PageColor {
    fn from_components(components: u8) -> Self {
        match components {
            1 => PageColor::Gray,
            4 => PageColor::Cmyk,
            _ => PageColor::Rgb,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PageColor::Gray => "DeviceGray",
            PageColor::Rgb => "DeviceRGB",
            PageColor::Cmyk => "DeviceCMYK",
        }
    }
}

/// JPEG data ready to be placed on a page
struct PageImage {
    width: u32,
    height: u32,
    color: PageColor,
    data: Vec<u8>,
}

/// Component count from the first start-of-frame marker
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // Fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return bytes.get(pos + 9).copied();
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }
        let length = usize::from(u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]));
        pos += 2 + length;
    }
    None
}

impl PdfEncoder {
    fn load(&self, path: &Path) -> Result<PageImage> {
        let bytes = fs::read(path)?;
        let image_err = |source: image::ImageError| Error::Image {
            path: path.to_path_buf(),
            source,
        };

        let format = image::guess_format(&bytes).map_err(image_err)?;
        if format == ImageFormat::Jpeg {
            let ((width, height), color_type) = {
                let decoder = JpegDecoder::new(Cursor::new(&bytes)).map_err(image_err)?;
                (decoder.dimensions(), decoder.color_type())
            };
            // The decoder reports CMYK frames as RGB, so trust the frame header
            let color = match jpeg_components(&bytes) {
                Some(components) => PageColor::from_components(components),
                None if matches!(color_type, ColorType::L8 | ColorType::L16) => PageColor::Gray,
                None => PageColor::Rgb,
            };
            return Ok(PageImage {
                width,
                height,
                color,
                data: bytes,
            });
        }

        ::log::debug!("Re-encoding {:?} page {} as JPEG", format, path.display());
        let rgb = image::load_from_memory_with_format(&bytes, format)
            .map_err(image_err)?
            .to_rgb8();
        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, self.jpeg_quality)
            .encode_image(&rgb)
            .map_err(image_err)?;

        Ok(PageImage {
            width: rgb.width(),
            height: rgb.height(),
            color: PageColor::Rgb,
            data,
        })
    }
}

impl PageEncoder for PdfEncoder {
    fn encode(&self, images: &[PathBuf], output: &Path) -> Result<()> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::with_capacity(images.len());
        for path in images {
            let image = self.load(path)?;
            kids.push(Object::Reference(add_page(&mut doc, pages_id, image)?));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.compress();
        doc.save(output)?;
        Ok(())
    }
}

/// 96 DPI, so one pixel is three quarters of a point
fn px_to_pt(px: u32) -> i64 {
    ((i64::from(px) * 3 + 2) / 4).max(1)
}

/// Adds a page sized to the image and drawing it edge to edge
fn add_page(doc: &mut Document, pages_id: ObjectId, image: PageImage) -> Result<ObjectId> {
    let width = px_to_pt(image.width);
    let height = px_to_pt(image.height);

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => image.color.name(),
        "BitsPerComponent" => 8_i64,
        "Filter" => "DCTDecode",
    };
    if image.color == PageColor::Cmyk {
        let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
            .into_iter()
            .map(Object::Integer)
            .collect();
        image_dict.set("Decode", decode);
    }
    let image_id = doc.add_object(Stream::new(image_dict, image.data).with_compression(false));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    Ok(page_id)
}
