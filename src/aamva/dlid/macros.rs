/// Declares the data element registry.
///
/// Each entry produces one variant of the element enum together with its
/// static [`FieldDefinition`](super::types::FieldDefinition). Entries marked
/// `empty` accept an empty value even when mandatory.
macro_rules! data_elements {
	($(#[$enum_meta:meta])* $vis:vis enum $enum_id:ident { $($(#[$meta:meta])* $id:ident : $tag:literal { $name:literal, $ty:ident, $max:literal, $cat:ident $(, $empty:ident)? }),* $(,)? }) => {
		$(#[$enum_meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		$vis enum $enum_id {
			$($(#[$meta])* $id),*
		}

		static DATA_ELEMENT_DEFINITIONS: [$crate::aamva::dlid::types::FieldDefinition; $enum_id::COUNT] = [$(
			$crate::aamva::dlid::types::FieldDefinition {
				code: $tag,
				name: $name,
				data_type: $crate::aamva::dlid::types::DataType::$ty,
				max_length: $max,
				category: $crate::aamva::dlid::types::Category::$cat,
				allow_empty: $crate::aamva::dlid::data_elements!(@empty $($empty)?),
			}
		),*];

		impl $enum_id {
			pub const COUNT: usize = $crate::aamva::dlid::data_elements!(@count $($id,)*);
			pub const LIST: [Self; Self::COUNT] = [$(Self::$id),*];

			pub fn from_code(code: &str) -> Option<Self> {
				match code {
					$($tag => Some(Self::$id),)*
					_ => None
				}
			}

			pub fn from_id(id: &[u8]) -> Option<Self> {
				std::str::from_utf8(id).ok().and_then(Self::from_code)
			}

			pub fn code(&self) -> &'static str {
				match self {
					$(Self::$id => $tag),*
				}
			}

			pub fn definition(&self) -> &'static $crate::aamva::dlid::types::FieldDefinition {
				&DATA_ELEMENT_DEFINITIONS[*self as usize]
			}
		}
	};
	(@empty empty) => {
		true
	};
	(@empty) => {
		false
	};
	(@count $a:ident, $($rest:ident,)*) => {
		1usize + $crate::aamva::dlid::data_elements!(@count $($rest,)*)
	};
	(@count) => {
		0usize
	}
}

pub(crate) use data_elements;
