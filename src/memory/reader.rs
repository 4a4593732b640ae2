use log::debug;
use widestring::U16Str;

use crate::{
    config::TracerConfig,
    memory::MemoryView,
    metadata::{
        provider::{ClassId, ObjectId, RuntimeMetadata},
        typesystem::{element_size, TypeNameResolver, ELEMENT_TYPE},
    },
    Error, Result,
};

/// Rendered for null references
pub const NULL_VALUE: &str = "<NULL>";
/// Rendered for values that cannot be read or classified
pub const UNKNOWN_VALUE: &str = "<?>";

/// Upper bound of the element count computed from array dimensions
const MAX_ARRAY_TOTAL: u64 = 1_000_000_000;

/// Renders the value stored at an address as text, driven by its element type tag.
///
/// Primitives are read directly, strings through the runtime's string layout, object
/// references as `TypeName 0xADDRESS` and arrays as
/// `TypeName 0xADDRESS [d1, d2] = {e1, e2, ...}`. Rendering never fails: anything that
/// cannot be read becomes [`UNKNOWN_VALUE`].
///
/// Addresses are trusted to lie inside the argument ranges the runtime reported for the
/// current call. The reader itself only bounds the amount of work: element count, string
/// length and nesting depth are capped by the [`TracerConfig`].
pub struct ArgumentReader<'a> {
    runtime: &'a dyn RuntimeMetadata,
    memory: &'a dyn MemoryView,
    max_array_elements: usize,
    max_depth: usize,
    max_string_chars: usize,
}

impl<'a> ArgumentReader<'a> {
    /// Create a reader with the caps of `config`
    #[must_use]
    pub fn new(
        runtime: &'a dyn RuntimeMetadata,
        memory: &'a dyn MemoryView,
        config: &TracerConfig,
    ) -> Self {
        ArgumentReader {
            runtime,
            memory,
            max_array_elements: config.max_array_elements,
            max_depth: config.max_argument_depth,
            max_string_chars: config.max_string_chars,
        }
    }

    /// Render the value of type `element_type` stored at `address`
    #[must_use]
    pub fn read(&self, element_type: u8, address: usize) -> String {
        self.read_at_depth(element_type, address, 0)
    }

    fn read_at_depth(&self, element_type: u8, address: usize, depth: usize) -> String {
        if depth >= self.max_depth {
            return UNKNOWN_VALUE.to_string();
        }

        let value = match element_type {
            ELEMENT_TYPE::STRING => self.read_string(address),
            ELEMENT_TYPE::BOOLEAN => self
                .memory
                .read_at::<u8>(address)
                .map(|value| (value != 0).to_string()),
            ELEMENT_TYPE::CHAR => self
                .memory
                .read_at::<u16>(address)
                .map(|unit| U16Str::from_slice(&[unit]).to_string_lossy()),
            ELEMENT_TYPE::I1 => self.memory.read_at::<i8>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::U1 => self.memory.read_at::<u8>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::I2 => self.memory.read_at::<i16>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::U2 => self.memory.read_at::<u16>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::I4 => self.memory.read_at::<i32>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::U4 => self.memory.read_at::<u32>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::I8 => self.memory.read_at::<i64>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::U8 => self.memory.read_at::<u64>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::R4 => self.memory.read_at::<f32>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::R8 => self.memory.read_at::<f64>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::I => self.memory.read_at::<isize>(address).map(|v| v.to_string()),
            ELEMENT_TYPE::U | ELEMENT_TYPE::PTR => {
                self.memory.read_at::<usize>(address).map(|v| v.to_string())
            }
            ELEMENT_TYPE::OBJECT | ELEMENT_TYPE::CLASS => self.read_object(address),
            ELEMENT_TYPE::SZARRAY | ELEMENT_TYPE::ARRAY => self.read_array(address, depth),
            ELEMENT_TYPE::VOID => Ok("void".to_string()),
            _ => return UNKNOWN_VALUE.to_string(),
        };

        value.unwrap_or_else(|error| {
            debug!(
                "Unreadable value of type 0x{:02X} at 0x{:X}: {}",
                element_type, address, error
            );
            UNKNOWN_VALUE.to_string()
        })
    }

    fn read_string(&self, address: usize) -> Result<String> {
        let object = self.memory.read_pointer_at(address)?;
        if object == 0 {
            return Ok(NULL_VALUE.to_string());
        }

        let layout = self.runtime.string_layout()?;
        let length = self
            .memory
            .read_at::<u32>(offset(object, layout.length_offset)?)? as usize;

        let shown = length.min(self.max_string_chars);
        let units = self
            .memory
            .read_u16_units(offset(object, layout.buffer_offset)?, shown)?;

        let mut text = U16Str::from_slice(&units).to_string_lossy();
        if shown < length {
            text.push_str("...");
        }

        Ok(format!("\"{text}\""))
    }

    fn read_object(&self, address: usize) -> Result<String> {
        let object = self.memory.read_pointer_at(address)?;
        if object == 0 {
            return Ok(NULL_VALUE.to_string());
        }

        Ok(match self.object_type_name(object) {
            Some(name) => format!("{name} 0x{object:X}"),
            None => format!("0x{object:X}"),
        })
    }

    fn read_array(&self, address: usize, depth: usize) -> Result<String> {
        let object = self.memory.read_pointer_at(address)?;
        if object == 0 {
            return Ok(NULL_VALUE.to_string());
        }

        let class = self.runtime.class_from_object(object)?;
        if class == 0 {
            return Err(unavailable_error!("Object 0x{:X} has no class", object));
        }

        let array = self
            .runtime
            .array_class(class)?
            .filter(|array| array.rank > 0)
            .ok_or_else(|| unavailable_error!("Class 0x{:X} is not an array class", class))?;

        let shape = self.runtime.array_object(object, array.rank)?;
        if shape.elements == 0 {
            return Err(unavailable_error!("Array 0x{:X} has no element data", object));
        }

        let mut total: u64 = 1;
        for size in &shape.dimension_sizes {
            total = total.saturating_mul(u64::from(*size));
            if total > MAX_ARRAY_TOTAL {
                total = MAX_ARRAY_TOTAL;
                break;
            }
        }

        let dimensions = shape
            .dimension_sizes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        if let Some(name) = self.object_type_name(object) {
            out.push_str(&name);
            out.push(' ');
        }
        out.push_str(&format!("0x{object:X} [{dimensions}] = {{"));

        let shown = total.min(self.max_array_elements as u64);
        let stride = self.element_stride(array.element_type, array.element_class);

        let mut element = shape.elements;
        for index in 0..shown {
            if index > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.read_at_depth(array.element_type, element, depth + 1));

            element = match element.checked_add(stride) {
                Some(next) => next,
                None => break,
            };
        }

        if total > shown {
            if shown > 0 {
                out.push_str(", ");
            }
            out.push_str("...");
        }
        out.push('}');

        Ok(out)
    }

    /// Size of one inline array element; value types use their class layout and anything
    /// unknown falls back to the pointer size
    fn element_stride(&self, element_type: u8, element_class: ClassId) -> usize {
        if let Some(size) = element_size(element_type) {
            return size;
        }

        if element_type == ELEMENT_TYPE::VALUETYPE && element_class != 0 {
            if let Ok(size) = self.runtime.class_size(element_class) {
                if size > 0 {
                    return size;
                }
            }
        }

        std::mem::size_of::<usize>()
    }

    fn object_type_name(&self, object: ObjectId) -> Option<String> {
        let class = self
            .runtime
            .class_from_object(object)
            .ok()
            .filter(|class| *class != 0)?;

        TypeNameResolver::new(self.runtime)
            .class_name(class)
            .ok()
            .filter(|name| !name.is_empty())
    }
}

fn offset(address: usize, delta: usize) -> Result<usize> {
    address
        .checked_add(delta)
        .ok_or(Error::InvalidAddress(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::BufferMemory,
        metadata::provider::{ArrayClass, ArrayObject, ClassInfo, StringLayout},
        test::MockRuntime,
    };

    const MODULE: usize = 1;
    const SLOT: usize = 0x1000;
    const HEAP: usize = 0x2000;
    const STRING_LAYOUT: StringLayout = StringLayout {
        length_offset: 8,
        buffer_offset: 12,
    };

    fn read(runtime: &MockRuntime, memory: &BufferMemory, element_type: u8) -> String {
        ArgumentReader::new(runtime, memory, &TracerConfig::default()).read(element_type, SLOT)
    }

    fn stage_string(memory: &mut BufferMemory, object: usize, text: &str) {
        let count = memory.write_utf16(object + STRING_LAYOUT.buffer_offset, text).unwrap();
        memory
            .write(object + STRING_LAYOUT.length_offset, count as u32)
            .unwrap();
    }

    #[test]
    fn test_primitives() {
        let runtime = MockRuntime::new();
        let mut memory = BufferMemory::new(SLOT, 16);

        memory.write(SLOT, -42i32).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::I4), "-42");
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::I1), "-42");

        memory.write(SLOT, 1u8).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::BOOLEAN), "true");

        memory.write(SLOT, u16::from(b'x')).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::CHAR), "x");

        memory.write(SLOT, 1.5f64).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::R8), "1.5");

        memory.write(SLOT, 0.25f32).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::R4), "0.25");

        memory.write(SLOT, u64::MAX).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::U8), u64::MAX.to_string());
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::VOID), "void");
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::VALUETYPE), UNKNOWN_VALUE);
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::BYREF), UNKNOWN_VALUE);
    }

    #[test]
    fn test_string() {
        let mut runtime = MockRuntime::new();
        runtime.set_string_layout(STRING_LAYOUT);
        let mut memory = BufferMemory::new(SLOT, 0x2000);

        memory.write(SLOT, HEAP).unwrap();
        stage_string(&mut memory, HEAP, "hello wörld");
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::STRING), "\"hello wörld\"");

        memory.write(SLOT, 0usize).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::STRING), NULL_VALUE);
    }

    #[test]
    fn test_long_string_is_truncated() {
        let mut runtime = MockRuntime::new();
        runtime.set_string_layout(STRING_LAYOUT);
        let mut memory = BufferMemory::new(SLOT, 0x2000);
        memory.write(SLOT, HEAP).unwrap();
        stage_string(&mut memory, HEAP, "abcdefgh");

        let config = TracerConfig {
            max_string_chars: 3,
            ..TracerConfig::default()
        };
        let reader = ArgumentReader::new(&runtime, &memory, &config);
        assert_eq!(reader.read(ELEMENT_TYPE::STRING, SLOT), "\"abc...\"");
    }

    #[test]
    fn test_string_without_layout_is_unknown() {
        let runtime = MockRuntime::new();
        let mut memory = BufferMemory::new(SLOT, 0x2000);
        memory.write(SLOT, HEAP).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::STRING), UNKNOWN_VALUE);
    }

    #[test]
    fn test_object_reference() {
        let mut runtime = MockRuntime::new();
        let widget = runtime.add_type_def(MODULE, "Widget", 0x0010_0001, &[]);
        runtime.add_class(
            7,
            ClassInfo {
                module_id: MODULE,
                type_token: widget,
                type_args: vec![],
            },
        );
        runtime.add_object(HEAP, 7);
        runtime.add_object(HEAP + 0x10, 99);

        let mut memory = BufferMemory::new(SLOT, 16);
        memory.write(SLOT, HEAP).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::CLASS), "Widget 0x2000");

        memory.write(SLOT, HEAP + 0x10).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::OBJECT), "0x2010");

        memory.write(SLOT, 0usize).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::OBJECT), NULL_VALUE);
    }

    fn stage_int_array(runtime: &mut MockRuntime, memory: &mut BufferMemory, dims: Vec<u32>) {
        runtime.add_class(30, ClassInfo::default());
        runtime.add_array_class(
            30,
            ArrayClass {
                element_type: ELEMENT_TYPE::I4,
                element_class: 0,
                rank: dims.len() as u32,
            },
        );
        runtime.add_object(HEAP, 30);
        runtime.add_array_object(
            HEAP,
            ArrayObject {
                lower_bounds: vec![0; dims.len()],
                dimension_sizes: dims,
                elements: HEAP + 0x10,
            },
        );
        memory.write(SLOT, HEAP).unwrap();
        for i in 0..32u32 {
            memory.write(HEAP + 0x10 + i as usize * 4, i as i32).unwrap();
        }
    }

    #[test]
    fn test_array_is_truncated() {
        let mut runtime = MockRuntime::new();
        let mut memory = BufferMemory::new(SLOT, 0x2000);
        stage_int_array(&mut runtime, &mut memory, vec![1000]);

        assert_eq!(
            read(&runtime, &memory, ELEMENT_TYPE::SZARRAY),
            "int[] 0x2000 [1000] = {0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, ...}"
        );
    }

    #[test]
    fn test_small_and_empty_arrays() {
        let mut runtime = MockRuntime::new();
        let mut memory = BufferMemory::new(SLOT, 0x2000);
        stage_int_array(&mut runtime, &mut memory, vec![2, 2]);
        assert_eq!(
            read(&runtime, &memory, ELEMENT_TYPE::ARRAY),
            "int[,] 0x2000 [2, 2] = {0, 1, 2, 3}"
        );

        let mut runtime = MockRuntime::new();
        stage_int_array(&mut runtime, &mut memory, vec![0]);
        assert_eq!(
            read(&runtime, &memory, ELEMENT_TYPE::SZARRAY),
            "int[] 0x2000 [0] = {}"
        );
    }

    #[test]
    fn test_zero_element_cap_elides_everything() {
        let mut runtime = MockRuntime::new();
        let mut memory = BufferMemory::new(SLOT, 0x2000);
        stage_int_array(&mut runtime, &mut memory, vec![5]);

        let config = TracerConfig::default().with_max_array_elements(0);
        assert_eq!(
            ArgumentReader::new(&runtime, &memory, &config).read(ELEMENT_TYPE::SZARRAY, SLOT),
            "int[] 0x2000 [5] = {...}"
        );
    }

    #[test]
    fn test_nested_arrays_hit_depth_cap() {
        let mut runtime = MockRuntime::new();
        runtime.add_class(40, ClassInfo::default());
        runtime.add_array_class(
            40,
            ArrayClass {
                element_type: ELEMENT_TYPE::SZARRAY,
                element_class: 40,
                rank: 1,
            },
        );

        // A self-referencing jagged array: every element points back at the array itself
        let mut memory = BufferMemory::new(SLOT, 0x2000);
        memory.write(SLOT, HEAP).unwrap();
        memory.write(HEAP + 0x10, HEAP).unwrap();
        runtime.add_object(HEAP, 40);
        runtime.add_array_object(
            HEAP,
            ArrayObject {
                dimension_sizes: vec![1],
                lower_bounds: vec![0],
                elements: HEAP + 0x10,
            },
        );

        let rendered = read(&runtime, &memory, ELEMENT_TYPE::SZARRAY);
        assert!(rendered.ends_with("= {<?>}}}"), "{rendered}");
        assert_eq!(rendered.matches("0x2000 [1]").count(), 3);
    }

    #[test]
    fn test_unclassifiable_array_is_unknown() {
        let runtime = MockRuntime::new();
        let mut memory = BufferMemory::new(SLOT, 16);
        memory.write(SLOT, HEAP).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::SZARRAY), UNKNOWN_VALUE);

        memory.write(SLOT, 0usize).unwrap();
        assert_eq!(read(&runtime, &memory, ELEMENT_TYPE::SZARRAY), NULL_VALUE);
    }

    #[test]
    fn test_value_type_stride() {
        let mut runtime = MockRuntime::new();
        runtime.set_class_size(50, 12);
        let memory = BufferMemory::new(SLOT, 16);
        let config = TracerConfig::default();
        let reader = ArgumentReader::new(&runtime, &memory, &config);

        assert_eq!(reader.element_stride(ELEMENT_TYPE::VALUETYPE, 50), 12);
        assert_eq!(
            reader.element_stride(ELEMENT_TYPE::VALUETYPE, 51),
            std::mem::size_of::<usize>()
        );
        assert_eq!(reader.element_stride(ELEMENT_TYPE::I2, 0), 2);
    }
}
